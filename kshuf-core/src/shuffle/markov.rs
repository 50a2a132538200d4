use log::debug;
use rand::Rng;

use super::MAX_GENERATED_LEN;
use super::sampling::categorical;
use crate::error::ShuffleError;
use crate::klet::{Alphabet, KletTable, TransitionGraph};

/// Order-(k-1) Markov chain generator over a k-let frequency table.
///
/// This is the cheap, approximate alternative to the Eulerian shuffle: every
/// symbol is drawn independently from the empirical transition counts of the
/// current (k-1)-let, with replacement. The output follows the input's
/// transition probabilities but does **not** reproduce its exact k-let
/// counts, nor its first and last symbols. Use the Eulerian shuffle when the
/// counts must match.
pub struct MarkovSampler {
	alphabet: Alphabet,
	/// Rows of the table; its flat weights are the k-let counts.
	graph: TransitionGraph,
	/// How often each symbol ends a k-let; the fallback for rows without exits.
	fallback: Vec<u64>,
}

impl MarkovSampler {
	/// Takes over the table's counts.
	///
	/// # Errors
	/// `EmptyTable` if the table holds no k-let at all.
	pub fn new(table: KletTable) -> Result<Self, ShuffleError> {
		if table.total() == 0 {
			return Err(ShuffleError::EmptyTable);
		}
		let alphabet = table.alphabet().clone();
		let graph = TransitionGraph::from_owned_table(table)?;
		let fallback = graph.symbol_totals();
		Ok(Self { alphabet, graph, fallback })
	}

	pub fn alphabet(&self) -> &Alphabet {
		&self.alphabet
	}

	pub fn k(&self) -> usize {
		self.graph.k()
	}

	/// Generates `length` symbol indices.
	///
	/// The first `k` symbols are one k-let drawn from the whole table. After
	/// that, each symbol is drawn from the row of the last `k - 1` symbols; a
	/// row with no exits (a (k-1)-let seen only at the very end of the input)
	/// falls back to the distribution of final symbols.
	///
	/// # Errors
	/// `LengthTooLarge` above [`MAX_GENERATED_LEN`].
	pub fn generate<R: Rng + ?Sized>(&self, length: usize, rng: &mut R) -> Result<Vec<usize>, ShuffleError> {
		if length > MAX_GENERATED_LEN {
			return Err(ShuffleError::LengthTooLarge { length, limit: MAX_GENERATED_LEN });
		}
		let k = self.graph.k();
		let vertices = self.graph.vertex_count();

		let first = categorical(self.graph.weights(), rng).ok_or(ShuffleError::EmptyTable)?;
		let mut out = self.alphabet.klet_symbols(first, k);
		out.truncate(length);

		// The last k-1 symbols of the first k-let.
		let mut vertex = first % vertices;
		let mut dead_ends = 0usize;
		while out.len() < length {
			let symbol = match categorical(self.graph.row(vertex), rng) {
				Some(symbol) => symbol,
				None => {
					dead_ends += 1;
					categorical(&self.fallback, rng).ok_or(ShuffleError::EmptyTable)?
				}
			};
			out.push(symbol);
			vertex = self.graph.successor(vertex, symbol);
		}

		if dead_ends > 0 {
			debug!("markov chain restarted from the final-symbol distribution {} times", dead_ends);
		}
		Ok(out)
	}

	/// Generates a sequence of `length` symbols as a string.
	pub fn generate_string<R: Rng + ?Sized>(&self, length: usize, rng: &mut R) -> Result<String, ShuffleError> {
		Ok(self.alphabet.decode(&self.generate(length, rng)?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn output_has_requested_length() {
		let table = KletTable::count("ACGTTGCAAGT", 3).unwrap();
		let sampler = MarkovSampler::new(table).unwrap();
		let mut rng = StdRng::seed_from_u64(9);
		for length in [0, 1, 2, 3, 50] {
			assert_eq!(sampler.generate(length, &mut rng).unwrap().len(), length);
		}
	}

	#[test]
	fn deterministic_transitions_are_followed() {
		// A is always followed by B and B by A
		let table = KletTable::count("ABABABAB", 2).unwrap();
		let sampler = MarkovSampler::new(table).unwrap();
		let out = sampler.generate_string(9, &mut StdRng::seed_from_u64(1)).unwrap();
		assert!(out == "ABABABABA" || out == "BABABABAB", "{}", out);
	}

	#[test]
	fn dead_end_falls_back_to_final_symbols() {
		// C occurs only at the end, so row C is empty
		let table = KletTable::count("AAAC", 2).unwrap();
		let sampler = MarkovSampler::new(table).unwrap();
		let mut rng = StdRng::seed_from_u64(4);
		let out = sampler.generate(200, &mut rng).unwrap();
		assert_eq!(out.len(), 200);
	}

	#[test]
	fn oversized_length_is_an_error() {
		let sampler = MarkovSampler::new(KletTable::count("ACGTTGCA", 2).unwrap()).unwrap();
		let mut rng = StdRng::seed_from_u64(1);
		assert_eq!(
			sampler.generate(usize::MAX, &mut rng),
			Err(ShuffleError::LengthTooLarge { length: usize::MAX, limit: MAX_GENERATED_LEN })
		);
		assert_eq!(sampler.generate(64, &mut rng).unwrap().len(), 64);
	}

	#[test]
	fn empty_table_is_rejected() {
		let table = KletTable::new(Alphabet::from_symbols("AC").unwrap(), 2).unwrap();
		assert!(matches!(MarkovSampler::new(table), Err(ShuffleError::EmptyTable)));
	}

	#[test]
	fn k_one_draws_from_symbol_frequencies() {
		let table = KletTable::count("AAAB", 1).unwrap();
		let sampler = MarkovSampler::new(table).unwrap();
		let out = sampler.generate(8000, &mut StdRng::seed_from_u64(2)).unwrap();
		let share = out.iter().filter(|&&s| s == 1).count() as f64 / 8000.0;
		assert!((share - 0.25).abs() < 0.03, "share = {}", share);
	}
}
