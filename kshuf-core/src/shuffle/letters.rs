use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use super::MAX_GENERATED_LEN;
use crate::error::ShuffleError;

/// Letters drawn independently, uniformly or by relative weight.
///
/// A letter may be several characters long (`"Ala,Gly"`), so the output is
/// a concatenation of letters rather than of single symbols.
#[derive(Clone, Debug)]
pub struct LetterSet {
	letters: Vec<String>,
	weights: Option<WeightedIndex<f64>>,
}

impl LetterSet {
	/// Parses `ACGT`-style letters (one per character) or comma-separated
	/// letters, and optional comma-separated weights in the same order.
	pub fn parse(letters: &str, weights: Option<&str>) -> Result<Self, ShuffleError> {
		let letters: Vec<String> = if letters.contains(',') {
			letters.split(',').map(str::trim).filter(|l| !l.is_empty()).map(str::to_owned).collect()
		} else {
			letters.chars().filter(|c| !c.is_whitespace()).map(String::from).collect()
		};

		let weights = match weights {
			Some(list) => Some(
				list.split(',')
					.map(str::trim)
					.filter(|w| !w.is_empty())
					.map(|w| w.parse::<f64>().map_err(|_| ShuffleError::InvalidWeights(format!("'{}' is not a number", w))))
					.collect::<Result<Vec<f64>, _>>()?,
			),
			None => None,
		};
		Self::new(letters, weights)
	}

	/// # Errors
	/// - `EmptyAlphabet` without letters
	/// - `InvalidWeights` if the weight count differs from the letter count, or
	///   the weights are negative, not finite or all zero
	pub fn new(letters: Vec<String>, weights: Option<Vec<f64>>) -> Result<Self, ShuffleError> {
		if letters.is_empty() {
			return Err(ShuffleError::EmptyAlphabet);
		}
		let weights = match weights {
			Some(w) if w.len() != letters.len() => {
				return Err(ShuffleError::InvalidWeights(format!(
					"{} letters but {} weights",
					letters.len(),
					w.len()
				)));
			}
			Some(w) => Some(WeightedIndex::new(w).map_err(|e| ShuffleError::InvalidWeights(e.to_string()))?),
			None => None,
		};
		Ok(Self { letters, weights })
	}

	pub fn letters(&self) -> &[String] {
		&self.letters
	}

	/// Draws `length` letters.
	///
	/// # Errors
	/// `LengthTooLarge` above [`MAX_GENERATED_LEN`].
	pub fn generate<R: Rng + ?Sized>(&self, length: usize, rng: &mut R) -> Result<String, ShuffleError> {
		if length > MAX_GENERATED_LEN {
			return Err(ShuffleError::LengthTooLarge { length, limit: MAX_GENERATED_LEN });
		}
		let mut out = String::new();
		for _ in 0..length {
			let index = match &self.weights {
				Some(dist) => dist.sample(rng),
				None => rng.random_range(0..self.letters.len()),
			};
			out.push_str(&self.letters[index]);
		}
		Ok(out)
	}
}
