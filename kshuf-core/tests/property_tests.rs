//! Property tests over random sequences.

use kshuf_core::klet::{Alphabet, StreamCounter};
use kshuf_core::shuffle::{Method, Shuffler};
use kshuf_core::{KletTable, ShuffleError};
use proptest::collection::vec;
use proptest::prelude::*;

fn sequence(alphabet: &'static [u8], len: std::ops::Range<usize>) -> impl Strategy<Value = String> {
	vec(prop::sample::select(alphabet.to_vec()), len).prop_map(|bytes| bytes.into_iter().map(char::from).collect())
}

proptest! {
	/// Euler shuffling keeps every k-let count and both (k-1)-let ends.
	#[test]
	fn euler_preserves_klets_and_ends(
		seq in sequence(b"ACGT", 2..160),
		k in 2usize..6,
		seed in any::<u64>()
	) {
		prop_assume!(k < seq.len());
		let out = Shuffler::new(k, Method::Euler).with_seed(seed).shuffle(&seq).unwrap();

		prop_assert_eq!(out.len(), seq.len());
		prop_assert_eq!(KletTable::count(&out, k).unwrap(), KletTable::count(&seq, k).unwrap());
		prop_assert_eq!(&out[..k - 1], &seq[..k - 1]);
		prop_assert_eq!(&out[out.len() - (k - 1)..], &seq[seq.len() - (k - 1)..]);
	}

	/// Skewed two-letter inputs exercise sparse graphs with empty vertices.
	#[test]
	fn euler_handles_sparse_graphs(
		seq in sequence(b"AAAAAAAB", 3..80),
		k in 2usize..5,
		seed in any::<u64>()
	) {
		prop_assume!(k < seq.len());
		let out = Shuffler::new(k, Method::Euler).with_seed(seed).shuffle(&seq).unwrap();
		prop_assert_eq!(KletTable::count(&out, k).unwrap(), KletTable::count(&seq, k).unwrap());
	}

	/// k = 1 is a permutation whatever the method.
	#[test]
	fn single_letter_shuffle_is_a_permutation(seq in sequence(b"ACGTN", 2..100), seed in any::<u64>()) {
		for method in [Method::Euler, Method::Markov, Method::Linear] {
			let out = Shuffler::new(1, method).with_seed(seed).shuffle(&seq).unwrap();
			let mut a: Vec<char> = out.chars().collect();
			let mut b: Vec<char> = seq.chars().collect();
			a.sort_unstable();
			b.sort_unstable();
			prop_assert_eq!(a, b);
		}
	}

	/// Same inputs and seed give byte-identical output.
	#[test]
	fn shuffling_is_deterministic(seq in sequence(b"ACGT", 5..120), k in 1usize..5, seed in any::<u64>()) {
		for method in [Method::Euler, Method::Markov, Method::Linear] {
			let shuffler = Shuffler::new(k, method).with_seed(seed);
			prop_assert_eq!(shuffler.shuffle(&seq).unwrap(), shuffler.shuffle(&seq).unwrap());
		}
	}

	/// Markov and linear modes keep the length and stay within the alphabet.
	#[test]
	fn approximate_modes_keep_length_and_alphabet(
		seq in sequence(b"ACGT", 4..120),
		k in 2usize..4,
		seed in any::<u64>()
	) {
		let alphabet = Alphabet::from_sequence(&seq).unwrap();
		for method in [Method::Markov, Method::Linear] {
			let out = Shuffler::new(k, method).with_seed(seed).shuffle(&seq).unwrap();
			prop_assert_eq!(out.len(), seq.len());
			prop_assert!(alphabet.encode(&out).is_ok());
		}
	}

	/// k at or above the length is always rejected.
	#[test]
	fn oversized_k_is_rejected(seq in sequence(b"ACGT", 1..20), extra in 0usize..5) {
		let k = seq.len() + extra;
		prop_assert_eq!(
			Shuffler::new(k, Method::Euler).with_seed(0).shuffle(&seq),
			Err(ShuffleError::InvalidK { k, len: seq.len() })
		);
	}

	/// Streaming and buffered counting agree.
	#[test]
	fn streaming_equals_buffered(seq in sequence(b"ACGT", 1..200), k in 1usize..6) {
		prop_assume!(k <= seq.len());
		let alphabet = Alphabet::from_symbols("ACGT").unwrap();
		let mut counter = StreamCounter::new(alphabet.clone(), k).unwrap();
		for c in seq.chars() {
			counter.push(c).unwrap();
		}
		let buffered = KletTable::count_encoded(alphabet.clone(), &alphabet.encode(&seq).unwrap(), k).unwrap();
		let streamed = counter.finish().unwrap();
		prop_assert_eq!(streamed.total(), (seq.len() - k + 1) as u64);
		prop_assert_eq!(streamed, buffered);
	}
}
