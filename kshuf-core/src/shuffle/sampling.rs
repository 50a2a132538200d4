use rand::Rng;

/// Draws an index with probability proportional to its weight.
///
/// This is the one weighted draw used everywhere: picking a vertex's
/// tentative last edge, the first k-let of a Markov chain and each following
/// Markov symbol.
///
/// It performs:
/// - an O(n) sum over the weights
/// - one `random_range` call
/// - a cumulative subtraction to select a bucket
///
/// Returns `None` (without touching the generator) if every weight is zero.
pub fn categorical<R: Rng + ?Sized>(weights: &[u64], rng: &mut R) -> Option<usize> {
	let total: u64 = weights.iter().sum();
	if total == 0 {
		return None;
	}

	let mut r = rng.random_range(0..total);
	for (index, &weight) in weights.iter().enumerate() {
		if r < weight {
			return Some(index);
		}
		r -= weight;
	}

	// r < total, so some bucket always takes it
	None
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn zero_weights_never_drawn() {
		let mut rng = StdRng::seed_from_u64(7);
		for _ in 0..500 {
			let i = categorical(&[0, 3, 0, 1], &mut rng).unwrap();
			assert!(i == 1 || i == 3);
		}
	}

	#[test]
	fn all_zero_is_none() {
		let mut rng = StdRng::seed_from_u64(7);
		assert_eq!(categorical(&[0, 0], &mut rng), None);
		assert_eq!(categorical(&[], &mut rng), None);
	}

	#[test]
	fn frequencies_follow_weights() {
		let mut rng = StdRng::seed_from_u64(11);
		let mut hits = [0u32; 2];
		for _ in 0..20_000 {
			hits[categorical(&[1, 3], &mut rng).unwrap()] += 1;
		}
		let share = f64::from(hits[1]) / 20_000.0;
		assert!((share - 0.75).abs() < 0.02, "share = {}", share);
	}
}
