use log::debug;

use super::euler::SuccessorLists;
use crate::error::ShuffleError;
use crate::klet::VertexSpace;

/// Emits a sequence by following successor lists from a fixed prefix.
///
/// Each visit to a vertex consumes the next entry of its list. With lists
/// from [`EulerianPathSampler`](super::euler::EulerianPathSampler) the walk
/// uses every edge exactly once, so the output has the same k-let counts and
/// the same first and last (k-1) symbols as the input.
pub struct SequenceWalker {
	space: VertexSpace,
	lists: SuccessorLists,
	cursor: Vec<usize>,
}

impl SequenceWalker {
	pub fn new(space: VertexSpace, lists: SuccessorLists) -> Self {
		let cursor = vec![0; lists.len()];
		Self { space, lists, cursor }
	}

	/// Walks until `length` symbols have been emitted, `prefix` included.
	///
	/// # Errors
	/// - `InvalidK` if `prefix` is not `k - 1` symbols or is longer than `length`
	/// - `ExhaustedVertex` if a list runs dry before the end (internal invariant)
	pub fn walk(mut self, prefix: &[usize], length: usize) -> Result<Vec<usize>, ShuffleError> {
		let k = self.space.k();
		if prefix.len() + 1 != k || prefix.len() > length {
			return Err(ShuffleError::InvalidK { k, len: length });
		}

		debug!("walking {} steps", length - prefix.len());
		let mut out = Vec::with_capacity(length);
		out.extend_from_slice(prefix);

		let mut vertex = self.space.vertex_of(prefix);
		while out.len() < length {
			let symbol = self
				.lists
				.get(vertex)
				.and_then(|list| list.get(self.cursor[vertex]))
				.copied()
				.ok_or(ShuffleError::ExhaustedVertex { vertex })?;
			self.cursor[vertex] += 1;
			out.push(symbol);
			vertex = self.space.successor(vertex, symbol);
		}

		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::klet::{KletTable, TransitionGraph};

	fn space(seq: &str, k: usize) -> VertexSpace {
		TransitionGraph::from_table(&KletTable::count(seq, k).unwrap()).unwrap().space()
	}

	#[test]
	fn follows_lists_in_order() {
		// A: [A, B, B, B], B: [A, A]
		let lists = vec![vec![0, 1, 1, 1], vec![0, 0]];
		let out = SequenceWalker::new(space("AABABAB", 2), lists).walk(&[0], 7).unwrap();
		assert_eq!(out, vec![0, 0, 1, 0, 1, 0, 1]);
	}

	#[test]
	fn dry_list_is_an_invariant_violation() {
		let lists = vec![vec![1], vec![]];
		let result = SequenceWalker::new(space("AABABAB", 2), lists).walk(&[0], 4);
		assert_eq!(result, Err(ShuffleError::ExhaustedVertex { vertex: 1 }));
	}

	#[test]
	fn prefix_must_be_k_minus_one_symbols() {
		let lists = vec![vec![0], vec![0]];
		let result = SequenceWalker::new(space("AABABAB", 2), lists).walk(&[0, 1], 4);
		assert_eq!(result, Err(ShuffleError::InvalidK { k: 2, len: 4 }));
	}
}
