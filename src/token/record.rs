//! Stored token record, its lifecycle status, and the on-disk timestamp codec.

// crates.io
use time::error::Format as FormatError;
// self
use crate::{
	_prelude::*,
	token::{
		id::{IdentifierError, TokenId},
		secret::TokenSecret,
	},
};

const ID_KEY: &str = "id";
const TOKEN_KEY: &str = "token";
const RESET_AT_KEY: &str = "resetAt";
const INVALID_KEY: &str = "invalid";
const MANAGED_KEYS: [&str; 4] = [ID_KEY, TOKEN_KEY, RESET_AT_KEY, INVALID_KEY];

/// Logical state of a record at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenStatus {
	/// The record may be handed out.
	Available,
	/// The record is parked.
	RateLimited {
		/// Instant after which the record becomes available again; `None` when the stored
		/// `resetAt` cannot be read as an instant, which keeps the record parked until it is
		/// marked valid.
		until: Option<OffsetDateTime>,
	},
	/// The record stays unusable until it is explicitly marked valid.
	Invalid,
}

/// Reading of the stored `resetAt` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetAt {
	/// Absent, `null`, empty, or zero: the record is not parked.
	Clear,
	/// A readable instant.
	At(OffsetDateTime),
	/// Present but not readable as an instant.
	Unreadable,
}

/// One credential entry in the token file.
///
/// The record is the stored JSON object itself. `id`, `token`, `resetAt`, and `invalid` are
/// read leniently through accessors and only the keys a mutation touches are rewritten, so
/// every other key (and every managed key nobody touched) goes back to storage verbatim.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenRecord {
	fields: Map<String, Value>,
}
impl TokenRecord {
	/// Creates a record with no lifecycle flags set.
	pub fn new(id: impl Into<String>, token: impl Into<String>) -> Result<Self, IdentifierError> {
		Ok(Self::with_id(TokenId::new(id)?, token))
	}

	/// Creates a record for an already validated identifier.
	pub fn with_id(id: TokenId, token: impl Into<String>) -> Self {
		let mut fields = Map::new();

		fields.insert(ID_KEY.into(), Value::from(id));
		fields.insert(TOKEN_KEY.into(), Value::String(token.into()));

		Self { fields }
	}

	/// Stored object, exactly as it will be written back.
	pub fn fields(&self) -> &Map<String, Value> {
		&self.fields
	}

	/// Mutable access to the stored object for provisioning-side fields.
	pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
		&mut self.fields
	}

	/// Consumes the record, returning the stored object.
	pub fn into_fields(self) -> Map<String, Value> {
		self.fields
	}

	/// Identifier, when the stored `id` is a non-empty string or a number.
	pub fn id(&self) -> Option<TokenId> {
		self.fields.get(ID_KEY).and_then(TokenId::from_json)
	}

	/// Returns `true` when the stored `id` strictly equals the identifier.
	pub fn has_id(&self, id: &TokenId) -> bool {
		self.fields.get(ID_KEY).is_some_and(|raw| id.matches(raw))
	}

	/// Credential, when the stored `token` is a string.
	pub fn token(&self) -> Option<TokenSecret> {
		self.fields.get(TOKEN_KEY).and_then(Value::as_str).map(TokenSecret::new)
	}

	/// Reads the stored `resetAt`.
	///
	/// Strings are tried as RFC 3339, RFC 2822, a bare `YYYY-MM-DD` date, and a zone-less
	/// `YYYY-MM-DDTHH:MM:SS[.fff]`; the last two are taken as UTC. Numbers are Unix
	/// milliseconds.
	pub fn reset_at(&self) -> ResetAt {
		self.fields.get(RESET_AT_KEY).map_or(ResetAt::Clear, reset_at::read)
	}

	/// Returns `true` when the stored `invalid` is truthy (anything but absent, `null`,
	/// `false`, `0`, or `""`).
	pub fn is_invalid(&self) -> bool {
		self.fields.get(INVALID_KEY).is_some_and(truthy)
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if self.is_invalid() {
			return TokenStatus::Invalid;
		}

		match self.reset_at() {
			ResetAt::At(until) if until > instant =>
				TokenStatus::RateLimited { until: Some(until) },
			ResetAt::Unreadable => TokenStatus::RateLimited { until: None },
			_ => TokenStatus::Available,
		}
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the record may be handed out at the provided instant.
	pub fn is_available_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Available)
	}

	/// Returns `true` if the record may be handed out right now.
	pub fn is_available(&self) -> bool {
		self.is_available_at(OffsetDateTime::now_utc())
	}

	/// Parks the record until the provided instant.
	///
	/// The instant is stored as a UTC string with millisecond precision, so anything finer is
	/// truncated here and [`reset_at`](Self::reset_at) reads back the truncated value.
	pub fn rate_limit_until(&mut self, instant: OffsetDateTime) -> Result<(), FormatError> {
		self.fields.insert(RESET_AT_KEY.into(), Value::String(reset_at::write(instant)?));

		Ok(())
	}

	/// Flags the record as permanently unusable.
	pub fn invalidate(&mut self) {
		self.fields.insert(INVALID_KEY.into(), Value::Bool(true));
	}

	/// Clears both flags and optionally swaps in a new credential.
	///
	/// An empty replacement is ignored so a blank form field cannot wipe a working token.
	pub fn revalidate(&mut self, replacement: Option<&str>) {
		self.fields.insert(INVALID_KEY.into(), Value::Bool(false));
		self.fields.insert(RESET_AT_KEY.into(), Value::Null);

		if let Some(token) = replacement.filter(|t| !t.is_empty()) {
			self.fields.insert(TOKEN_KEY.into(), Value::String(token.into()));
		}
	}
}
impl From<Map<String, Value>> for TokenRecord {
	fn from(fields: Map<String, Value>) -> Self {
		Self { fields }
	}
}
impl From<TokenRecord> for Value {
	fn from(record: TokenRecord) -> Self {
		Value::Object(record.fields)
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let extra = self
			.fields
			.keys()
			.filter(|key| !MANAGED_KEYS.contains(&key.as_str()))
			.collect::<Vec<_>>();

		f.debug_struct("TokenRecord")
			.field("id", &self.fields.get(ID_KEY))
			.field("token", &"<redacted>")
			.field("reset_at", &self.fields.get(RESET_AT_KEY))
			.field("invalid", &self.fields.get(INVALID_KEY))
			.field("extra", &extra)
			.finish()
	}
}

fn truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(flag) => *flag,
		Value::Number(n) => n.as_f64().is_none_or(|v| v != 0.0),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

/// `resetAt` codec: ISO-8601 UTC with millisecond precision on write, several common
/// timestamp shapes on read.
mod reset_at {
	// crates.io
	use time::{
		Date, PrimitiveDateTime,
		format_description::{
			BorrowedFormatItem,
			well_known::{Rfc2822, Rfc3339},
		},
		macros::format_description,
	};
	// self
	use super::{FormatError, ResetAt};
	use crate::_prelude::*;

	const ISO_MILLIS: &[BorrowedFormatItem<'_>] = format_description!(
		"[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
	);
	const DATE_ONLY: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
	const NAIVE: &[BorrowedFormatItem<'_>] = format_description!(
		"[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
	);

	/// Instants whose UTC form leaves the representable range clamp to its nearest end.
	pub(super) fn write(instant: OffsetDateTime) -> Result<String, FormatError> {
		let utc = OffsetDateTime::from_unix_timestamp_nanos(instant.unix_timestamp_nanos())
			.unwrap_or_else(|_| {
				if instant.year() < 0 {
					PrimitiveDateTime::MIN.assume_utc()
				} else {
					PrimitiveDateTime::MAX.assume_utc()
				}
			});

		utc.format(ISO_MILLIS)
	}

	pub(super) fn read(raw: &Value) -> ResetAt {
		match raw {
			Value::Null => ResetAt::Clear,
			Value::String(s) if s.is_empty() => ResetAt::Clear,
			Value::String(s) => parse_text(s).map_or(ResetAt::Unreadable, ResetAt::At),
			Value::Number(n) => match n.as_f64() {
				Some(millis) if millis == 0.0 => ResetAt::Clear,
				Some(millis) if millis.is_finite() =>
					OffsetDateTime::from_unix_timestamp_nanos((millis * 1_000_000.) as i128)
						.map_or(ResetAt::Unreadable, ResetAt::At),
				_ => ResetAt::Unreadable,
			},
			Value::Bool(false) => ResetAt::Clear,
			_ => ResetAt::Unreadable,
		}
	}

	fn parse_text(raw: &str) -> Option<OffsetDateTime> {
		let raw = raw.trim();

		if let Ok(instant) =
			OffsetDateTime::parse(raw, &Rfc3339).or_else(|_| OffsetDateTime::parse(raw, &Rfc2822))
		{
			return Some(instant);
		}
		if let Ok(date) = Date::parse(raw, DATE_ONLY) {
			return Some(date.midnight().assume_utc());
		}

		PrimitiveDateTime::parse(raw, NAIVE).ok().map(PrimitiveDateTime::assume_utc)
	}
}
