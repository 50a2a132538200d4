//! Sequence shuffling that keeps some of the input's local composition.
//!
//! - `k = 1`: a uniform permutation of the symbols
//! - `Method::Euler`: exact k-let counts, via a random Eulerian trail
//! - `Method::Markov`: k-let transition probabilities only
//! - `Method::Linear`: block permutation, keeps only the symbol multiset

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::ShuffleError;
use crate::klet::{Alphabet, KletTable, TransitionGraph};

/// Shared weighted draw.
pub mod sampling;

/// Random Eulerian trail sampling by cycle popping.
pub mod euler;

/// Emits a sequence from Eulerian successor lists.
pub mod walker;

/// Approximate order-(k-1) Markov generation.
pub mod markov;

/// Block permutation.
pub mod linear;

/// Independent draws over a weighted letter set.
pub mod letters;

pub use euler::{EulerianPathSampler, SuccessorLists};
pub use letters::LetterSet;
pub use markov::MarkovSampler;
pub use walker::SequenceWalker;

/// Longest sequence the generators agree to produce in one call.
pub const MAX_GENERATED_LEN: usize = 1 << 28;

/// Shuffling strategy for `k > 1`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Method {
	#[default]
	Euler,
	Markov,
	Linear,
}

impl FromStr for Method {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"euler" => Ok(Method::Euler),
			"markov" => Ok(Method::Markov),
			"linear" => Ok(Method::Linear),
			other => Err(format!("unknown shuffling method '{}', expected euler, markov or linear", other)),
		}
	}
}

impl fmt::Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Method::Euler => "euler",
			Method::Markov => "markov",
			Method::Linear => "linear",
		};
		f.write_str(name)
	}
}

/// Current UNIX time in seconds, the seed used when none is given.
pub fn default_seed() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// Shuffles sequences with a fixed k, method and seed.
///
/// A given (sequence, k, method, seed) always produces the same output: a
/// single `StdRng` is seeded per call and threaded through every draw in a
/// fixed order.
///
/// ```
/// use kshuf_core::shuffle::{Method, Shuffler};
///
/// let shuffler = Shuffler::new(2, Method::Euler).with_seed(42);
/// let out = shuffler.shuffle("AABABAB").unwrap();
/// assert_eq!(out.len(), 7);
/// assert!(out.starts_with('A') && out.ends_with('B'));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shuffler {
	k: usize,
	method: Method,
	seed: u64,
}

impl Shuffler {
	pub fn new(k: usize, method: Method) -> Self {
		Self { k, method, seed: default_seed() }
	}

	pub fn with_seed(mut self, seed: u64) -> Self {
		self.seed = seed;
		self
	}

	pub fn k(&self) -> usize {
		self.k
	}

	pub fn method(&self) -> Method {
		self.method
	}

	pub fn seed(&self) -> u64 {
		self.seed
	}

	/// Shuffles `sequence` with a generator seeded from `self.seed`.
	///
	/// # Errors
	/// - `EmptyAlphabet` for an empty sequence
	/// - `InvalidK` unless `1 <= k < len(sequence)`
	/// - `DisconnectedGraph` / `ExhaustedVertex` on internal invariant violations
	pub fn shuffle(&self, sequence: &str) -> Result<String, ShuffleError> {
		let mut rng = StdRng::seed_from_u64(self.seed);
		self.shuffle_with(sequence, &mut rng)
	}

	/// Same as [`Shuffler::shuffle`] but draws from a caller-provided generator.
	pub fn shuffle_with<R: Rng + ?Sized>(&self, sequence: &str, rng: &mut R) -> Result<String, ShuffleError> {
		let alphabet = Alphabet::from_sequence(sequence)?;
		let symbols = alphabet.encode(sequence)?;
		let k = self.k;
		if k == 0 || k >= symbols.len() {
			return Err(ShuffleError::InvalidK { k, len: symbols.len() });
		}
		debug!("shuffling {} symbols over {} letters, k = {}, method = {}", symbols.len(), alphabet.len(), k, self.method);

		let out = if k == 1 {
			let mut out = symbols;
			out.shuffle(rng);
			out
		} else {
			match self.method {
				Method::Euler => euler_shuffle(alphabet.clone(), &symbols, k, rng)?,
				Method::Markov => {
					let table = KletTable::count_encoded(alphabet.clone(), &symbols, k)?;
					MarkovSampler::new(table)?.generate(symbols.len(), rng)?
				}
				Method::Linear => linear::shuffle_blocks(&symbols, k, rng),
			}
		};

		Ok(alphabet.decode(&out))
	}
}

/// Count, build the graph, sample an Eulerian trail and walk it.
fn euler_shuffle<R: Rng + ?Sized>(
	alphabet: Alphabet,
	symbols: &[usize],
	k: usize,
	rng: &mut R,
) -> Result<Vec<usize>, ShuffleError> {
	let graph = TransitionGraph::from_owned_table(KletTable::count_encoded(alphabet, symbols, k)?)?;
	let space = graph.space();

	let first = &symbols[..k - 1];
	let root = space.vertex_of(&symbols[symbols.len() - (k - 1)..]);

	let lists = EulerianPathSampler::new(graph, root).sample(rng)?;
	SequenceWalker::new(space, lists).walk(first, symbols.len())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn method_parses_case_insensitively() {
		assert_eq!("Markov".parse::<Method>(), Ok(Method::Markov));
		assert_eq!("euler".parse::<Method>(), Ok(Method::Euler));
		assert!("random".parse::<Method>().is_err());
		assert_eq!(Method::Linear.to_string(), "linear");
	}

	#[test]
	fn invalid_k_is_rejected() {
		for k in [0, 4, 5] {
			let result = Shuffler::new(k, Method::Euler).with_seed(1).shuffle("ACGT");
			assert_eq!(result, Err(ShuffleError::InvalidK { k, len: 4 }));
		}
	}

	#[test]
	fn short_input_cannot_ask_for_a_huge_table() {
		let seq = "AB".repeat(15);
		for method in [Method::Euler, Method::Markov] {
			let result = Shuffler::new(28, method).with_seed(1).shuffle(&seq);
			assert_eq!(result, Err(ShuffleError::TableTooLarge { alphabet: 2, k: 28 }));
		}
	}

	#[test]
	fn empty_sequence_is_rejected() {
		assert_eq!(Shuffler::new(1, Method::Euler).shuffle(""), Err(ShuffleError::EmptyAlphabet));
	}

	#[test]
	fn every_method_keeps_the_length() {
		let seq = "ACGGTACCATGGACTTTACG";
		for method in [Method::Euler, Method::Markov, Method::Linear] {
			for k in 1..5 {
				let out = Shuffler::new(k, method).with_seed(17).shuffle(seq).unwrap();
				assert_eq!(out.chars().count(), seq.len(), "{} k = {}", method, k);
			}
		}
	}

	#[test]
	fn same_seed_same_output() {
		let seq = "ACGGTACCATGGACTTTACGATTAGC";
		for method in [Method::Euler, Method::Markov, Method::Linear] {
			let shuffler = Shuffler::new(3, method).with_seed(2024);
			assert_eq!(shuffler.shuffle(seq).unwrap(), shuffler.shuffle(seq).unwrap());
		}
	}
}
