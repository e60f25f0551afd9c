//! Pool-level error types shared across the token model, stores, and the strict pool paths.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by the strict (`try_*`) APIs.
///
/// The lenient pool operations never return it; they downgrade every variant into a
/// diagnostic and a no-op instead.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Identifier validation failure.
	#[error(transparent)]
	Identifier(#[from] crate::token::IdentifierError),
	/// A reset instant could not be rendered for storage.
	#[error("Failed to format the reset instant: {0}.")]
	Timestamp(#[from] time::error::Format),
	/// A stored entry could not be decoded as a token record.
	#[error("Entry {index} is not a valid token record: {source}.")]
	Decode {
		/// Position of the entry inside the stored sequence.
		index: usize,
		/// Structured decoding failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The stored or submitted document is not a sequence of records.
	#[error("Expected a JSON array of token records, found {found}.")]
	RejectedDocument {
		/// JSON type name of the offending document.
		found: &'static str,
	},
}
impl Error {
	/// Builds a [`Error::RejectedDocument`] describing the provided JSON value.
	pub fn rejected(document: &Value) -> Self {
		Self::RejectedDocument { found: json_kind(document) }
	}
}

/// Returns a short JSON type name for diagnostics.
pub(crate) fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
