use thiserror::Error;

/// Errors raised while counting, building or shuffling k-let structures.
///
/// `InvalidK`, `EmptyAlphabet`, `UnknownSymbol` and `InvalidTableSize` describe
/// bad input and abort the current call. `DisconnectedGraph` and
/// `ExhaustedVertex` are internal invariant violations: they cannot happen for a
/// frequency table counted from a real sequence, so seeing one means the
/// counting or graph stage is wrong, not the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShuffleError {
	#[error("invalid k-let size {k} for a sequence of length {len}")]
	InvalidK { k: usize, len: usize },

	#[error("cannot derive an alphabet from an empty sequence")]
	EmptyAlphabet,

	#[error("unknown symbol '{symbol}' at position {position}")]
	UnknownSymbol { symbol: char, position: usize },

	#[error("frequency table has {actual} entries, expected {expected}")]
	InvalidTableSize { expected: usize, actual: usize },

	#[error("vertex {vertex} cannot reach the terminal vertex {root}")]
	DisconnectedGraph { vertex: usize, root: usize },

	#[error("successor list of vertex {vertex} exhausted before the walk ended")]
	ExhaustedVertex { vertex: usize },

	#[error("{alphabet}^{k} k-lets exceed the frequency table limit")]
	TableTooLarge { alphabet: usize, k: usize },

	#[error("frequency table holds no k-lets")]
	EmptyTable,

	#[error("requested length {length} exceeds the limit of {limit}")]
	LengthTooLarge { length: usize, limit: usize },

	#[error("invalid letters or weights: {0}")]
	InvalidWeights(String),

	#[error("table mismatch: {0}")]
	TableMismatch(String),

	#[error("invalid window: {0}")]
	InvalidWindow(String),

	#[error("I/O error: {0}")]
	Io(String),

	#[error("serialization error: {0}")]
	Serialization(String),
}

impl ShuffleError {
	/// True for errors caused by the caller's input rather than by a broken invariant.
	pub fn is_input_error(&self) -> bool {
		!matches!(
			self,
			ShuffleError::DisconnectedGraph { .. }
				| ShuffleError::ExhaustedVertex { .. }
				| ShuffleError::Io(_)
				| ShuffleError::Serialization(_)
		)
	}
}

impl From<std::io::Error> for ShuffleError {
	fn from(e: std::io::Error) -> Self {
		ShuffleError::Io(e.to_string())
	}
}

impl From<postcard::Error> for ShuffleError {
	fn from(e: postcard::Error) -> Self {
		ShuffleError::Serialization(e.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invariant_violations_are_not_input_errors() {
		assert!(!ShuffleError::DisconnectedGraph { vertex: 1, root: 0 }.is_input_error());
		assert!(!ShuffleError::ExhaustedVertex { vertex: 3 }.is_input_error());
		assert!(ShuffleError::InvalidK { k: 0, len: 4 }.is_input_error());
		assert!(ShuffleError::EmptyAlphabet.is_input_error());
		assert!(ShuffleError::LengthTooLarge { length: 9, limit: 1 }.is_input_error());
	}

	#[test]
	fn unknown_symbol_message_names_character_and_position() {
		let e = ShuffleError::UnknownSymbol { symbol: 'N', position: 12 };
		assert_eq!(e.to_string(), "unknown symbol 'N' at position 12");
	}
}
