use rand::Rng;
use rand::seq::SliceRandom;

/// Shuffles whole blocks of `k` symbols.
///
/// The sequence is cut into `len / k` consecutive blocks whose order is
/// permuted uniformly; the `len % k` trailing symbols stay at the end.
/// Only the length and the symbol multiset are preserved.
pub fn shuffle_blocks<T: Copy, R: Rng + ?Sized>(symbols: &[T], k: usize, rng: &mut R) -> Vec<T> {
	if k == 0 {
		return symbols.to_vec();
	}
	let mut blocks: Vec<&[T]> = symbols.chunks_exact(k).collect();
	blocks.shuffle(rng);

	let mut out: Vec<T> = Vec::with_capacity(symbols.len());
	for block in blocks {
		out.extend_from_slice(block);
	}
	out.extend_from_slice(symbols.chunks_exact(k).remainder());
	out
}
