//! K-let preserving sequence shuffling.
//!
//! This crate randomizes symbol sequences (DNA, protein, any small alphabet)
//! while controlling how much local composition survives, for building null
//! models:
//! - Alphabet indexing and k-let frequency tables (buffered, streaming,
//!   parallel and windowed counting)
//! - The (k-1)-let transition multigraph
//! - Exact k-let preserving shuffles through random Eulerian trails
//! - Approximate Markov-chain generation, block shuffles and random
//!   sequences over a weighted letter set
//!
//! Everything is a pure function of (sequence, k, method, seed).

/// Error type shared by every module.
pub mod error;

/// Alphabets, k-let tables and the transition graph.
pub mod klet;

/// Shuffling methods and the `Shuffler` entry point.
pub mod shuffle;

/// Sequence file helpers (whitespace stripping, output paths, listings).
pub mod io;

pub use error::ShuffleError;
pub use klet::{Alphabet, KletTable, TransitionGraph};
pub use shuffle::{Method, Shuffler};
