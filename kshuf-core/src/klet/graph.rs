use super::alphabet::klet_index;
use super::table::KletTable;
use crate::error::ShuffleError;

/// Vertex arithmetic of the (k-1)-let space, independent of any edge weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexSpace {
	alphabet_len: usize,
	k: usize,
	/// `A^(k-2)` for `k >= 2`: range of a vertex once its first symbol is dropped.
	suffix_span: usize,
}

impl VertexSpace {
	/// Vertex reached from `vertex` by emitting `symbol`.
	pub fn successor(&self, vertex: usize, symbol: usize) -> usize {
		if self.k < 2 {
			return 0;
		}
		(vertex % self.suffix_span) * self.alphabet_len + symbol
	}

	/// Vertex id of a run of exactly `k - 1` symbol indices.
	pub fn vertex_of(&self, symbols: &[usize]) -> usize {
		debug_assert_eq!(symbols.len(), self.k - 1);
		klet_index(symbols, self.alphabet_len)
	}

	/// Number of vertices, `A^(k-1)`.
	pub fn vertex_count(&self) -> usize {
		if self.k < 2 { 1 } else { self.suffix_span * self.alphabet_len }
	}

	/// The `A` vertices with an edge into `vertex`, with the symbol that edge emits.
	///
	/// Inverse of [`successor`](Self::successor), computed without any table.
	pub fn predecessors(&self, vertex: usize) -> impl Iterator<Item = (usize, usize)> + use<> {
		let a = self.alphabet_len;
		let span = self.suffix_span;
		let single = self.k < 2;
		(0..a).map(move |x| if single { (0, x) } else { (x * span + vertex / a, vertex % a) })
	}

	pub fn alphabet_len(&self) -> usize {
		self.alphabet_len
	}

	pub fn k(&self) -> usize {
		self.k
	}
}

/// Directed multigraph whose vertices are (k-1)-lets and whose edges are k-lets.
///
/// Vertex `v` has one candidate out-edge per symbol `c`, leading to the
/// (k-1)-let obtained by dropping the first symbol of `v` and appending `c`.
/// Its multiplicity is `count[v * A + c]`, so the rows are the frequency
/// table reshaped into `A^(k-1)` rows of `A` columns, stored flat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionGraph {
	space: VertexSpace,
	weights: Vec<u64>,
	empty: Vec<bool>,
}

impl TransitionGraph {
	/// Builds the graph from a copy of the table's counts.
	pub fn from_table(table: &KletTable) -> Result<Self, ShuffleError> {
		Self::from_vec(table.counts().to_vec(), table.alphabet().len(), table.k())
	}

	/// Builds the graph by taking over the table's counts, without copying them.
	pub fn from_owned_table(table: KletTable) -> Result<Self, ShuffleError> {
		let (alphabet, k, counts) = table.into_parts();
		Self::from_vec(counts, alphabet.len(), k)
	}

	/// Reshapes a raw frequency table.
	///
	/// # Errors
	/// `InvalidTableSize` unless `counts.len() == A^k`.
	pub fn from_counts(counts: &[u64], alphabet_len: usize, k: usize) -> Result<Self, ShuffleError> {
		Self::from_vec(counts.to_vec(), alphabet_len, k)
	}

	fn from_vec(weights: Vec<u64>, alphabet_len: usize, k: usize) -> Result<Self, ShuffleError> {
		if k == 0 {
			return Err(ShuffleError::InvalidK { k, len: 0 });
		}
		if alphabet_len == 0 {
			return Err(ShuffleError::EmptyAlphabet);
		}
		let expected = u32::try_from(k)
			.ok()
			.and_then(|exp| alphabet_len.checked_pow(exp))
			.ok_or(ShuffleError::TableTooLarge { alphabet: alphabet_len, k })?;
		if expected != weights.len() {
			return Err(ShuffleError::InvalidTableSize { expected, actual: weights.len() });
		}

		let empty: Vec<bool> = weights.chunks(alphabet_len).map(|row| row.iter().all(|&w| w == 0)).collect();
		let vertices = empty.len();
		let suffix_span = if k >= 2 { vertices / alphabet_len } else { 0 };

		Ok(Self { space: VertexSpace { alphabet_len, k, suffix_span }, weights, empty })
	}

	pub fn space(&self) -> VertexSpace {
		self.space
	}

	pub fn alphabet_len(&self) -> usize {
		self.space.alphabet_len
	}

	pub fn k(&self) -> usize {
		self.space.k
	}

	/// Number of vertices, `A^(k-1)`.
	pub fn vertex_count(&self) -> usize {
		self.empty.len()
	}

	/// Every edge multiplicity, row after row: the frequency table itself.
	pub fn weights(&self) -> &[u64] {
		&self.weights
	}

	/// Out-edge multiplicities of `vertex`, one per symbol.
	pub fn row(&self, vertex: usize) -> &[u64] {
		let a = self.space.alphabet_len;
		&self.weights[vertex * a..(vertex + 1) * a]
	}

	pub(crate) fn row_mut(&mut self, vertex: usize) -> &mut [u64] {
		let a = self.space.alphabet_len;
		&mut self.weights[vertex * a..(vertex + 1) * a]
	}

	pub fn out_degree(&self, vertex: usize) -> u64 {
		self.row(vertex).iter().sum()
	}

	/// True when the vertex has no outgoing edge at all.
	pub fn is_empty_vertex(&self, vertex: usize) -> bool {
		self.empty[vertex]
	}

	pub fn empty_vertices(&self) -> &[bool] {
		&self.empty
	}

	pub fn successor(&self, vertex: usize, symbol: usize) -> usize {
		self.space.successor(vertex, symbol)
	}

	pub fn vertex_of(&self, symbols: &[usize]) -> usize {
		self.space.vertex_of(symbols)
	}

	/// Column sums: how often each symbol ends a k-let.
	pub fn symbol_totals(&self) -> Vec<u64> {
		let mut totals = vec![0; self.space.alphabet_len];
		for row in self.weights.chunks(self.space.alphabet_len) {
			for (total, w) in totals.iter_mut().zip(row) {
				*total += w;
			}
		}
		totals
	}
}
