use serde::{Deserialize, Serialize};

use crate::error::ShuffleError;

/// Largest frequency table (number of k-lets) the crate agrees to allocate.
///
/// An Euler shuffle holds the table, the graph rows, the last exits and the
/// successor lists at once, each of this order.
pub const MAX_TABLE_LEN: usize = 1 << 24;

/// Ordered set of distinct symbols of a sequence.
///
/// Symbols are kept sorted, so index `i` always denotes the `i`-th smallest
/// symbol. Every k-let index and graph vertex id is a mixed-radix number over
/// these indices:
/// `id = Σ symbol[j] * A^(k-1-j)`.
///
/// ## Invariants
/// - `symbols` is sorted and free of duplicates
/// - `symbols` is never empty
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
	symbols: Vec<char>,
}

impl Alphabet {
	/// Collects the distinct symbols present in `sequence`.
	///
	/// # Errors
	/// `EmptyAlphabet` if the sequence is empty.
	pub fn from_sequence(sequence: &str) -> Result<Self, ShuffleError> {
		Self::from_symbols(sequence)
	}

	/// Builds an alphabet from an explicit list of symbols (duplicates allowed).
	///
	/// Used by streaming counters, which cannot look at the whole sequence first.
	pub fn from_symbols(symbols: &str) -> Result<Self, ShuffleError> {
		let mut symbols: Vec<char> = symbols.chars().collect();
		symbols.sort_unstable();
		symbols.dedup();
		if symbols.is_empty() {
			return Err(ShuffleError::EmptyAlphabet);
		}
		Ok(Self { symbols })
	}

	/// Number of symbols (`A`).
	pub fn len(&self) -> usize {
		self.symbols.len()
	}

	pub fn is_empty(&self) -> bool {
		self.symbols.is_empty()
	}

	pub fn symbols(&self) -> &[char] {
		&self.symbols
	}

	pub fn index_of(&self, symbol: char) -> Option<usize> {
		self.symbols.binary_search(&symbol).ok()
	}

	/// Symbol at `index`. Panics on an out-of-range index, like slice indexing.
	pub fn symbol(&self, index: usize) -> char {
		self.symbols[index]
	}

	/// Maps every symbol of `sequence` to its index.
	///
	/// # Errors
	/// `UnknownSymbol` with the character and its position for the first
	/// foreign symbol.
	pub fn encode(&self, sequence: &str) -> Result<Vec<usize>, ShuffleError> {
		sequence
			.chars()
			.enumerate()
			.map(|(position, symbol)| {
				self.index_of(symbol).ok_or(ShuffleError::UnknownSymbol { symbol, position })
			})
			.collect()
	}

	/// Maps indices back to symbols.
	pub fn decode(&self, indices: &[usize]) -> String {
		indices.iter().map(|&i| self.symbols[i]).collect()
	}

	/// Number of distinct k-lets, `A^k`.
	///
	/// # Errors
	/// `TableTooLarge` if `A^k` overflows or exceeds [`MAX_TABLE_LEN`].
	pub fn klet_space(&self, k: usize) -> Result<usize, ShuffleError> {
		let too_large = ShuffleError::TableTooLarge { alphabet: self.len(), k };
		let exp = u32::try_from(k).map_err(|_| too_large.clone())?;
		match self.len().checked_pow(exp) {
			Some(n) if n <= MAX_TABLE_LEN => Ok(n),
			_ => Err(too_large),
		}
	}

	/// Splits a k-let index into its `k` symbol indices, most significant first.
	pub fn klet_symbols(&self, mut id: usize, k: usize) -> Vec<usize> {
		let a = self.len();
		let mut out = vec![0; k];
		for slot in out.iter_mut().rev() {
			*slot = id % a;
			id /= a;
		}
		out
	}

	/// Renders a k-let index as its string, e.g. `6` with `k = 2` over `ACGT` → `"CG"`.
	pub fn klet_label(&self, id: usize, k: usize) -> String {
		self.decode(&self.klet_symbols(id, k))
	}
}

/// Mixed-radix index of a run of symbol indices.
pub fn klet_index(symbols: &[usize], alphabet_len: usize) -> usize {
	symbols.iter().fold(0, |id, &s| id * alphabet_len + s)
}
