//! Maps downstream HTTP responses onto pool bookkeeping.

/// How a downstream response affects the token that was used for the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseClass {
	/// `429 Too Many Requests`: park the token.
	RateLimited,
	/// `401 Unauthorized` or `403 Forbidden`: the credential is no longer accepted.
	Rejected,
	/// Anything else leaves the token untouched.
	Neutral,
}
impl ResponseClass {
	/// Classifies an HTTP status code.
	pub const fn of(status: u16) -> Self {
		match status {
			429 => Self::RateLimited,
			401 | 403 => Self::Rejected,
			_ => Self::Neutral,
		}
	}
}

/// Result of a targeted mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
	/// The record was found, changed, and the document was written.
	Updated,
	/// The record was found but the change never reached storage.
	WriteFailed,
	/// No record matched the identifier; storage was not written.
	Missing,
}

/// Result of [`TokenPool::remove_token`](crate::pool::TokenPool::remove_token).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
	/// At least one entry carried the identifier and was dropped.
	Removed,
	/// At least one entry matched but the filtered document never reached storage.
	WriteFailed,
	/// Nothing matched; the remaining document was still written back.
	Missing,
}

/// What [`TokenPool::report_response`](crate::pool::TokenPool::report_response) did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseVerdict {
	/// The token was parked for the configured window.
	RateLimited(MarkOutcome),
	/// The token was flagged invalid.
	Invalid(MarkOutcome),
	/// The status did not concern the token.
	Untouched,
}
