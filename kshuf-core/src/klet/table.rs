use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::debug;
use serde::{Deserialize, Serialize};

use super::alphabet::{Alphabet, klet_index};
use crate::error::ShuffleError;

/// Below this many windows, `count_parallel` does not bother spawning threads.
const PARALLEL_MIN_WINDOWS: usize = 1 << 16;

/// Frequency table of every possible k-let over an alphabet.
///
/// `counts[id]` is the number of (overlapping) occurrences of the k-let with
/// mixed-radix index `id`, as seen through a sliding window of width `k`.
///
/// ## Invariants
/// - `k >= 1`
/// - `counts.len() == A^k`
/// - for a table counted from a sequence of length `N`, `total() == N - k + 1`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct KletTable {
	alphabet: Alphabet,
	k: usize,
	counts: Vec<u64>,
}

impl KletTable {
	/// Creates a zeroed table.
	pub fn new(alphabet: Alphabet, k: usize) -> Result<Self, ShuffleError> {
		if k == 0 {
			return Err(ShuffleError::InvalidK { k, len: 0 });
		}
		let size = alphabet.klet_space(k)?;
		Ok(Self { alphabet, k, counts: vec![0; size] })
	}

	/// Wraps externally produced counts.
	///
	/// # Errors
	/// `InvalidTableSize` if `counts` does not hold exactly `A^k` entries.
	pub fn from_counts(alphabet: Alphabet, k: usize, counts: Vec<u64>) -> Result<Self, ShuffleError> {
		let mut table = Self::new(alphabet, k)?;
		if counts.len() != table.counts.len() {
			return Err(ShuffleError::InvalidTableSize { expected: table.counts.len(), actual: counts.len() });
		}
		table.counts = counts;
		Ok(table)
	}

	/// Counts the k-lets of a sequence, deriving the alphabet from it.
	///
	/// The whole sequence is held in memory; see [`StreamCounter`] for the
	/// single-pass variant over a known alphabet.
	pub fn count(sequence: &str, k: usize) -> Result<Self, ShuffleError> {
		let alphabet = Alphabet::from_sequence(sequence)?;
		let symbols = alphabet.encode(sequence)?;
		Self::count_encoded(alphabet, &symbols, k)
	}

	/// Counts the k-lets of an already encoded sequence.
	///
	/// # Errors
	/// `InvalidK` if `k == 0` or `k` exceeds the sequence length.
	pub fn count_encoded(alphabet: Alphabet, symbols: &[usize], k: usize) -> Result<Self, ShuffleError> {
		if k == 0 || k > symbols.len() {
			return Err(ShuffleError::InvalidK { k, len: symbols.len() });
		}
		let mut table = Self::new(alphabet, k)?;
		let a = table.alphabet.len();
		for window in symbols.windows(k) {
			table.counts[klet_index(window, a)] += 1;
		}
		debug!("counted {} {}-lets over a {}-letter alphabet", symbols.len() - k + 1, k, a);
		Ok(table)
	}

	/// Same result as [`KletTable::count`], spread over `num_cpus * 8` threads.
	///
	/// The window range is cut into chunks; every chunk carries the `k - 1`
	/// symbols that its last windows overhang, is counted on its own thread and
	/// the partial tables are merged.
	pub fn count_parallel(sequence: &str, k: usize) -> Result<Self, ShuffleError> {
		let alphabet = Alphabet::from_sequence(sequence)?;
		let symbols = alphabet.encode(sequence)?;
		if k == 0 || k > symbols.len() {
			return Err(ShuffleError::InvalidK { k, len: symbols.len() });
		}

		let windows = symbols.len() - k + 1;
		if windows < PARALLEL_MIN_WINDOWS {
			return Self::count_encoded(alphabet, &symbols, k);
		}

		let chunks = num_cpus::get() * 8;
		let chunk_size = windows.div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		let mut spawned = 0;
		for start in (0..windows).step_by(chunk_size) {
			let end = (start + chunk_size).min(windows);
			let chunk: Vec<usize> = symbols[start..end + k - 1].to_vec();
			let alphabet = alphabet.clone();
			let tx = tx.clone();

			thread::spawn(move || {
				// The receiver outlives every sender; a failed send only means it gave up.
				let _ = tx.send(KletTable::count_encoded(alphabet, &chunk, k));
			});
			spawned += 1;
		}
		drop(tx);

		let mut final_table = Self::new(alphabet, k)?;
		let mut received = 0;
		for partial in rx.iter() {
			final_table.merge(&partial?)?;
			received += 1;
		}

		if received != spawned {
			return Err(ShuffleError::TableMismatch(format!("{} of {} counting threads reported", received, spawned)));
		}
		debug!("merged {} partial tables", received);
		Ok(final_table)
	}

	/// Counts a stream line by line over a caller-supplied alphabet.
	///
	/// Whitespace is skipped; only `k` symbols are ever held.
	pub fn count_reader<R: BufRead>(alphabet: Alphabet, k: usize, reader: R) -> Result<Self, ShuffleError> {
		let mut counter = StreamCounter::new(alphabet, k)?;
		for line in reader.lines() {
			for symbol in line?.chars() {
				counter.push(symbol)?;
			}
		}
		counter.finish()
	}

	/// Adds the counts of `other` to this table.
	///
	/// # Errors
	/// `TableMismatch` if the alphabets or k-let sizes differ.
	pub fn merge(&mut self, other: &Self) -> Result<(), ShuffleError> {
		if self.k != other.k {
			return Err(ShuffleError::TableMismatch(format!("k {} vs {}", self.k, other.k)));
		}
		if self.alphabet != other.alphabet {
			return Err(ShuffleError::TableMismatch("alphabets differ".to_owned()));
		}
		for (count, extra) in self.counts.iter_mut().zip(&other.counts) {
			*count += extra;
		}
		Ok(())
	}

	pub fn k(&self) -> usize {
		self.k
	}

	pub fn alphabet(&self) -> &Alphabet {
		&self.alphabet
	}

	pub fn counts(&self) -> &[u64] {
		&self.counts
	}

	/// Splits the table into its alphabet, k and counts.
	pub fn into_parts(self) -> (Alphabet, usize, Vec<u64>) {
		(self.alphabet, self.k, self.counts)
	}

	/// Total number of counted windows.
	pub fn total(&self) -> u64 {
		self.counts.iter().sum()
	}

	/// Count of a k-let given as a string, `None` if it is not over the alphabet
	/// or has the wrong length.
	pub fn get(&self, klet: &str) -> Option<u64> {
		let symbols = self.alphabet.encode(klet).ok()?;
		if symbols.len() != self.k {
			return None;
		}
		Some(self.counts[klet_index(&symbols, self.alphabet.len())])
	}

	/// `(label, count)` for every k-let, in index order.
	pub fn rows(&self) -> impl Iterator<Item = (String, u64)> + '_ {
		self.counts
			.iter()
			.enumerate()
			.map(|(id, &count)| (self.alphabet.klet_label(id, self.k), count))
	}

	/// Writes the table with postcard.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ShuffleError> {
		let bytes = postcard::to_stdvec(self)?;
		std::fs::write(path, bytes)?;
		Ok(())
	}

	/// Reads a table written by [`KletTable::save`] and re-checks its size.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ShuffleError> {
		let bytes = std::fs::read(path)?;
		let table: Self = postcard::from_bytes(&bytes)?;
		Self::from_counts(table.alphabet, table.k, table.counts)
	}
}

/// Single-pass k-let counter holding a rolling window of width `k`.
///
/// The window is kept as its mixed-radix index: each new symbol drops the
/// most significant digit and appends itself as the least significant one.
pub struct StreamCounter {
	table: KletTable,
	/// `A^(k-1)`, the range of the window index once its oldest symbol is dropped.
	modulus: usize,
	current: usize,
	filled: usize,
	position: usize,
}

impl StreamCounter {
	pub fn new(alphabet: Alphabet, k: usize) -> Result<Self, ShuffleError> {
		let table = KletTable::new(alphabet, k)?;
		let modulus = table.counts.len() / table.alphabet.len();
		Ok(Self { table, modulus, current: 0, filled: 0, position: 0 })
	}

	/// Feeds one character. Whitespace is ignored.
	///
	/// # Errors
	/// `UnknownSymbol` for a character outside the alphabet; `position` counts
	/// non-whitespace symbols from 0.
	pub fn push(&mut self, symbol: char) -> Result<(), ShuffleError> {
		if symbol.is_whitespace() {
			return Ok(());
		}
		let index = self
			.table
			.alphabet
			.index_of(symbol)
			.ok_or(ShuffleError::UnknownSymbol { symbol, position: self.position })?;
		self.position += 1;

		self.current = (self.current % self.modulus) * self.table.alphabet.len() + index;
		if self.filled < self.table.k {
			self.filled += 1;
		}
		if self.filled == self.table.k {
			self.table.counts[self.current] += 1;
		}
		Ok(())
	}

	/// Number of symbols consumed so far.
	pub fn consumed(&self) -> usize {
		self.position
	}

	/// # Errors
	/// `InvalidK` if fewer than `k` symbols were pushed.
	pub fn finish(self) -> Result<KletTable, ShuffleError> {
		if self.filled < self.table.k {
			return Err(ShuffleError::InvalidK { k: self.table.k, len: self.position });
		}
		Ok(self.table)
	}
}

/// Counts of one window of [`count_windows`], with 1-based inclusive bounds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WindowCounts {
	pub start: usize,
	pub stop: usize,
	pub counts: Vec<u64>,
}

/// Counts k-lets inside successive windows of an encoded sequence.
///
/// Windows hold `window` symbols and advance by `step`. Trailing windows may
/// be shorter; counting stops at the first one shorter than `k`.
///
/// # Errors
/// - `InvalidWindow` unless `window >= k` and `1 <= step <= window`
/// - `InvalidK` if `k == 0` or the first window is shorter than `k`
pub fn count_windows(
	alphabet: &Alphabet,
	symbols: &[usize],
	k: usize,
	window: usize,
	step: usize,
) -> Result<Vec<WindowCounts>, ShuffleError> {
	if k == 0 {
		return Err(ShuffleError::InvalidK { k, len: symbols.len() });
	}
	if window < k {
		return Err(ShuffleError::InvalidWindow(format!("window size {} is smaller than k {}", window, k)));
	}
	if step < 1 || step > window {
		return Err(ShuffleError::InvalidWindow(format!("step size {} must be between 1 and {}", step, window)));
	}
	if symbols.len() < k {
		return Err(ShuffleError::InvalidK { k, len: symbols.len() });
	}

	let mut rows = Vec::new();
	let mut start = 0;
	while start < symbols.len() {
		let stop = (start + window).min(symbols.len());
		if stop - start < k {
			break;
		}
		let table = KletTable::count_encoded(alphabet.clone(), &symbols[start..stop], k)?;
		rows.push(WindowCounts { start: start + 1, stop, counts: table.counts });
		start += step;
	}
	Ok(rows)
}
