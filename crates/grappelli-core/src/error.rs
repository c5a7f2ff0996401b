//! Unified error type for all data-access operations
//!
//! Every fallible operation in the engine returns this one error enum.
//! Codec and predicate failures indicate schema/programming mismatches and
//! always propagate; transport failures from executor implementations pass
//! through unmodified inside [`Error::Transport`] — the engine never retries,
//! a re-fetch is always safe for the caller to trigger explicitly.

/// Result type for all grappelli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the data-access layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A native value fell outside the field's domain at encode time
	#[error("validation failed for `{field}`: {message}")]
	Validation { field: String, message: String },

	/// A wire value could not be converted back into the native type
	#[error("malformed wire value for `{field}`: {message}")]
	Decode { field: String, message: String },

	/// No record exists for the given identifier
	#[error("no record with identifier `{0}`")]
	NotFound(String),

	/// Index outside the resolved window, or negative index on an unbounded view
	#[error("index {index} out of bounds: {message}")]
	OutOfBounds { index: i64, message: String },

	/// Operation the backend profile cannot serve (e.g. reversal without a count hint)
	#[error("unsupported operation: {0}")]
	Unsupported(String),

	/// The backend violated the list/get contract
	#[error("invalid backend response: {0}")]
	InvalidResponse(String),

	/// Opaque failure from the transport layer, passed through unmodified
	#[error("transport failure: {0}")]
	Transport(#[from] anyhow::Error),
}

impl Error {
	pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
		Error::Validation {
			field: field.into(),
			message: message.into(),
		}
	}

	pub fn decode(field: impl Into<String>, message: impl Into<String>) -> Self {
		Error::Decode {
			field: field.into(),
			message: message.into(),
		}
	}

	pub fn out_of_bounds(index: i64, message: impl Into<String>) -> Self {
		Error::OutOfBounds {
			index,
			message: message.into(),
		}
	}
}
