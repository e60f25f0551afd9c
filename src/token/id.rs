//! Opaque record identifiers that keep the JSON form they were stored with.

// std
use std::borrow::Cow;
// self
use crate::_prelude::*;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Token identifier cannot be empty.")]
	Empty,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum IdRepr {
	Text(String),
	Number(serde_json::Number),
}

/// Stable identifier of a stored token record.
///
/// Provisioning scripts write either strings or numbers; the identifier keeps that distinction
/// so a rewrite never turns `7` into `"7"`. Matching is strict: `"7"` and `7` are different
/// identifiers.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IdRepr", into = "IdRepr")]
pub struct TokenId(IdRepr);
impl TokenId {
	/// Creates a textual identifier after validation.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		IdRepr::Text(value.into()).try_into()
	}

	/// Creates a numeric identifier.
	pub fn numeric(value: u64) -> Self {
		Self(IdRepr::Number(value.into()))
	}

	/// Returns the identifier rendered as text, borrowing when it already is.
	pub fn as_text(&self) -> Cow<'_, str> {
		match &self.0 {
			IdRepr::Text(s) => Cow::Borrowed(s),
			IdRepr::Number(n) => Cow::Owned(n.to_string()),
		}
	}

	/// Returns `true` when the identifier was stored as a JSON number.
	pub fn is_numeric(&self) -> bool {
		matches!(self.0, IdRepr::Number(_))
	}

	/// Reads an identifier out of a raw stored `id` value, if it has a usable shape.
	pub fn from_json(raw: &Value) -> Option<Self> {
		Self::deserialize(raw).ok()
	}

	/// Strict equality against a raw stored `id` value.
	///
	/// Strings compare by content and numbers by value, so `7` matches `7.0` but never `"7"`.
	pub fn matches(&self, raw: &Value) -> bool {
		match (&self.0, raw) {
			(IdRepr::Text(s), Value::String(other)) => s == other,
			(IdRepr::Number(n), Value::Number(other)) =>
				n == other || n.as_f64().is_some_and(|v| other.as_f64() == Some(v)),
			_ => false,
		}
	}
}
impl TryFrom<IdRepr> for TokenId {
	type Error = IdentifierError;

	fn try_from(value: IdRepr) -> Result<Self, Self::Error> {
		if matches!(&value, IdRepr::Text(s) if s.is_empty()) {
			return Err(IdentifierError::Empty);
		}

		Ok(Self(value))
	}
}
impl From<TokenId> for IdRepr {
	fn from(value: TokenId) -> Self {
		value.0
	}
}
impl From<TokenId> for Value {
	fn from(value: TokenId) -> Self {
		match value.0 {
			IdRepr::Text(s) => Value::String(s),
			IdRepr::Number(n) => Value::Number(n),
		}
	}
}
impl From<u64> for TokenId {
	fn from(value: u64) -> Self {
		Self::numeric(value)
	}
}
impl Debug for TokenId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match &self.0 {
			IdRepr::Text(s) => write!(f, "Token({s:?})"),
			IdRepr::Number(n) => write!(f, "Token({n})"),
		}
	}
}
impl Display for TokenId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.as_text())
	}
}
impl FromStr for TokenId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
