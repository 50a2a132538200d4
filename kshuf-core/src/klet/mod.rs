//! K-let bookkeeping: alphabets, frequency tables and the transition graph
//! built from them.

/// Sorted symbol set and the mixed-radix k-let indexing built on it.
pub mod alphabet;

/// Frequency tables: buffered, streaming, parallel and windowed counting,
/// merging and persistence.
pub mod table;

/// (k-1)-let transition multigraph reshaped from a frequency table.
pub mod graph;

pub use alphabet::{Alphabet, MAX_TABLE_LEN, klet_index};
pub use graph::{TransitionGraph, VertexSpace};
pub use table::{KletTable, StreamCounter, WindowCounts, count_windows};
