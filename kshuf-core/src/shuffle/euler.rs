use std::collections::VecDeque;

use log::{debug, trace};
use rand::Rng;
use rand::seq::SliceRandom;

use super::sampling::categorical;
use crate::error::ShuffleError;
use crate::klet::TransitionGraph;

/// Successor symbols of every vertex, in the order a walk must consume them.
///
/// Empty vertices get an empty list. Every non-root vertex ends with its
/// reserved last edge.
pub type SuccessorLists = Vec<Vec<usize>>;

/// Samples a random Eulerian ordering of the edges of a transition graph.
///
/// The walk must start at the first (k-1)-let of the sequence and end at
/// `root`, the last one. The sampler picks, for every other vertex, a last
/// exit such that the last exits form a tree directed towards `root`; once
/// those are reserved, any order of the remaining exits gives an Eulerian
/// trail.
///
/// Last exits are chosen by cycle popping: random walks weighted by edge
/// multiplicity run until they hit a resolved vertex, later choices
/// overwriting earlier ones, so a loop in the walk is discarded as soon as
/// it is left again.
pub struct EulerianPathSampler {
	graph: TransitionGraph,
	root: usize,
}

impl EulerianPathSampler {
	pub fn new(graph: TransitionGraph, root: usize) -> Self {
		Self { graph, root }
	}

	pub fn graph(&self) -> &TransitionGraph {
		&self.graph
	}

	pub fn root(&self) -> usize {
		self.root
	}

	/// Checks that every non-empty vertex can reach the root.
	///
	/// Runs a breadth-first search from the root over reversed edges. It also
	/// rejects edges into an empty vertex other than the root, which would be
	/// a dead end for the walk.
	///
	/// # Errors
	/// `DisconnectedGraph` naming the first offending vertex.
	pub fn check_connected(&self) -> Result<(), ShuffleError> {
		let graph = &self.graph;
		let n = graph.vertex_count();
		if self.root >= n {
			return Err(ShuffleError::DisconnectedGraph { vertex: self.root, root: self.root });
		}

		for vertex in (0..n).filter(|&v| !graph.is_empty_vertex(v)) {
			for (symbol, &weight) in graph.row(vertex).iter().enumerate() {
				let next = graph.successor(vertex, symbol);
				if weight > 0 && next != self.root && graph.is_empty_vertex(next) {
					return Err(ShuffleError::DisconnectedGraph { vertex, root: self.root });
				}
			}
		}

		let space = graph.space();
		let mut reached = vec![false; n];
		reached[self.root] = true;
		let mut queue = VecDeque::from([self.root]);
		while let Some(vertex) = queue.pop_front() {
			for (pred, symbol) in space.predecessors(vertex) {
				if !reached[pred] && graph.row(pred)[symbol] > 0 {
					reached[pred] = true;
					queue.push_back(pred);
				}
			}
		}

		match (0..n).find(|&v| !reached[v] && !graph.is_empty_vertex(v)) {
			Some(vertex) => Err(ShuffleError::DisconnectedGraph { vertex, root: self.root }),
			None => Ok(()),
		}
	}

	/// Chooses the last outgoing symbol of every non-empty, non-root vertex.
	///
	/// The root and empty vertices are `None`. Following the returned symbols
	/// from any vertex reaches the root without revisiting a vertex.
	///
	/// Runs [`check_connected`](Self::check_connected) first, so every random
	/// walk is known to end.
	///
	/// # Errors
	/// `DisconnectedGraph` if some non-empty vertex cannot reach the root.
	pub fn last_edges<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Option<usize>>, ShuffleError> {
		self.check_connected()?;
		let graph = &self.graph;
		let n = graph.vertex_count();
		let disconnected = |vertex| ShuffleError::DisconnectedGraph { vertex, root: self.root };

		let mut resolved = graph.empty_vertices().to_vec();
		resolved[self.root] = true;
		let mut last: Vec<Option<usize>> = vec![None; n];
		let mut path: Vec<usize> = Vec::with_capacity(n);

		for start in 0..n {
			// Random walk until something resolved is hit; loops get overwritten.
			let mut u = start;
			while !resolved[u] {
				let symbol = categorical(graph.row(u), rng).ok_or_else(|| disconnected(u))?;
				last[u] = Some(symbol);
				u = graph.successor(u, symbol);
			}

			// The surviving choices from `start` are loop free.
			path.clear();
			let mut u = start;
			while !resolved[u] {
				if path.len() >= n {
					return Err(disconnected(start));
				}
				path.push(u);
				u = graph.successor(u, last[u].ok_or_else(|| disconnected(u))?);
			}
			for &vertex in &path {
				resolved[vertex] = true;
			}
			if !path.is_empty() {
				trace!("resolved {} vertices from {}", path.len(), start);
			}
		}

		Ok(last)
	}

	/// Produces the successor lists of a random Eulerian trail.
	///
	/// Reserves each non-root vertex's last edge, expands the remaining
	/// multiplicities into symbol lists, shuffles each list and appends the
	/// reserved edge at the end.
	pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> Result<SuccessorLists, ShuffleError> {
		debug!(
			"finding a random Eulerian path over {} vertices",
			self.graph.empty_vertices().iter().filter(|&&e| !e).count()
		);
		let last = self.last_edges(rng)?;

		let Self { mut graph, root } = self;
		for (vertex, symbol) in last.iter().enumerate() {
			if vertex == root {
				continue;
			}
			if let Some(symbol) = *symbol {
				graph.row_mut(vertex)[symbol] -= 1;
			}
		}

		debug!("generating successor lists");
		let mut lists: SuccessorLists = Vec::with_capacity(graph.vertex_count());
		for vertex in 0..graph.vertex_count() {
			if graph.is_empty_vertex(vertex) {
				lists.push(Vec::new());
				continue;
			}

			let mut list: Vec<usize> = Vec::with_capacity(graph.out_degree(vertex) as usize + 1);
			for (symbol, &weight) in graph.row(vertex).iter().enumerate() {
				list.extend(std::iter::repeat_n(symbol, weight as usize));
			}
			list.shuffle(rng);

			if vertex != root {
				list.push(last[vertex].ok_or(ShuffleError::DisconnectedGraph { vertex, root })?);
			}
			lists.push(list);
		}

		Ok(lists)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::klet::{Alphabet, KletTable};
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn sampler(seq: &str, k: usize) -> EulerianPathSampler {
		let alphabet = Alphabet::from_sequence(seq).unwrap();
		let symbols = alphabet.encode(seq).unwrap();
		let table = KletTable::count_encoded(alphabet, &symbols, k).unwrap();
		let graph = TransitionGraph::from_table(&table).unwrap();
		let root = graph.vertex_of(&symbols[symbols.len() - (k - 1)..]);
		EulerianPathSampler::new(graph, root)
	}

	#[test]
	fn last_edges_lead_to_root() {
		let s = sampler("ACGTTGCAAGGTCCATGACTTAGC", 3);
		let mut rng = StdRng::seed_from_u64(3);
		for _ in 0..50 {
			let last = s.last_edges(&mut rng).unwrap();
			let g = s.graph();
			for start in (0..g.vertex_count()).filter(|&v| !g.is_empty_vertex(v)) {
				let mut u = start;
				let mut steps = 0;
				while u != s.root() {
					u = g.successor(u, last[u].unwrap());
					steps += 1;
					assert!(steps <= g.vertex_count(), "vertex {} loops", start);
				}
			}
			assert_eq!(last[s.root()], None);
		}
	}

	#[test]
	fn lists_keep_every_edge() {
		let s = sampler("AABABAB", 2);
		let rows: Vec<Vec<u64>> = (0..2).map(|v| s.graph().row(v).to_vec()).collect();
		let lists = s.sample(&mut StdRng::seed_from_u64(5)).unwrap();

		for (vertex, list) in lists.iter().enumerate() {
			let mut counts = vec![0u64; 2];
			for &symbol in list {
				counts[symbol] += 1;
			}
			assert_eq!(counts, rows[vertex]);
		}
		// A's only way to the root B is its B edge, which must come last
		assert_eq!(lists[0].last(), Some(&1));
	}

	#[test]
	fn unreachable_vertex_is_reported() {
		// A only loops on itself, B only on itself: A never reaches the root B
		let graph = TransitionGraph::from_counts(&[1, 0, 0, 1], 2, 2).unwrap();
		let s = EulerianPathSampler::new(graph, 1);
		assert_eq!(s.check_connected(), Err(ShuffleError::DisconnectedGraph { vertex: 0, root: 1 }));
		assert_eq!(
			s.last_edges(&mut StdRng::seed_from_u64(1)),
			Err(ShuffleError::DisconnectedGraph { vertex: 0, root: 1 })
		);
		assert!(s.sample(&mut StdRng::seed_from_u64(1)).is_err());
	}

	#[test]
	fn out_of_range_root_is_reported() {
		let graph = TransitionGraph::from_counts(&[1, 1, 1, 1], 2, 2).unwrap();
		let s = EulerianPathSampler::new(graph, 2);
		assert_eq!(
			s.last_edges(&mut StdRng::seed_from_u64(1)),
			Err(ShuffleError::DisconnectedGraph { vertex: 2, root: 2 })
		);
	}

	#[test]
	fn dead_end_outside_root_is_reported() {
		// A -> B, but B has no exit and the root is A
		let graph = TransitionGraph::from_counts(&[0, 1, 0, 0], 2, 2).unwrap();
		let s = EulerianPathSampler::new(graph, 0);
		assert_eq!(s.check_connected(), Err(ShuffleError::DisconnectedGraph { vertex: 0, root: 0 }));
	}
}
