//! Optional observability helpers for pool operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named `token_pool.op` with an `op`
//!   field, plus a `warn`/`error` event for every diagnostic the pool reports.
//! - Enable `metrics` to increment the `token_pool_diagnostic_total` counter (labeled by
//!   `kind`) and the `token_pool_selection_total` counter (labeled by `outcome`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Pool operations observed by spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolOp {
	/// Reading the token document.
	Load,
	/// Replacing the token document.
	Save,
	/// Handing out the next available token.
	Select,
	/// Checking whether any token is available.
	Query,
	/// Parking a token until a reset instant.
	MarkRateLimited,
	/// Flagging a token as permanently unusable.
	MarkInvalid,
	/// Clearing a token's flags.
	MarkValid,
	/// Deleting a token.
	Remove,
	/// Mapping an upstream HTTP status onto a mark operation.
	ReportResponse,
}
impl PoolOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			PoolOp::Load => "load",
			PoolOp::Save => "save",
			PoolOp::Select => "select",
			PoolOp::Query => "query",
			PoolOp::MarkRateLimited => "mark_rate_limited",
			PoolOp::MarkInvalid => "mark_invalid",
			PoolOp::MarkValid => "mark_valid",
			PoolOp::Remove => "remove",
			PoolOp::ReportResponse => "report_response",
		}
	}
}
impl Display for PoolOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Non-fatal conditions the pool recovers from locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
	/// The document exists but could not be read or parsed.
	StorageRead,
	/// Writing the document failed; storage keeps its prior contents.
	StorageWrite,
	/// A document that is not a JSON array was read or submitted.
	RejectedDocument,
	/// A stored entry is not a JSON object; it is left out and dropped by the next write.
	SkippedEntry,
	/// No record matched the targeted identifier.
	NotFound,
}
impl DiagnosticKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			DiagnosticKind::StorageRead => "storage_read",
			DiagnosticKind::StorageWrite => "storage_write",
			DiagnosticKind::RejectedDocument => "rejected_document",
			DiagnosticKind::SkippedEntry => "skipped_entry",
			DiagnosticKind::NotFound => "not_found",
		}
	}

	/// Returns `true` for I/O failures, which are logged at `error` rather than `warn`.
	pub const fn is_storage_failure(self) -> bool {
		matches!(self, DiagnosticKind::StorageRead | DiagnosticKind::StorageWrite)
	}
}
impl Display for DiagnosticKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each selection attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionOutcome {
	/// A token was handed out.
	Selected,
	/// No token was available.
	Exhausted,
}
impl SelectionOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SelectionOutcome::Selected => "selected",
			SelectionOutcome::Exhausted => "exhausted",
		}
	}
}
impl Display for SelectionOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
