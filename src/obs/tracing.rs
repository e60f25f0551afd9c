// self
use crate::{
	_prelude::*,
	obs::{DiagnosticKind, PoolOp},
};

/// A span builder used by pool operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation.
	pub fn new(op: PoolOp) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!("token_pool.op", op = op.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = op;

			Self {}
		}
	}

	/// Enters the span for the rest of the operation.
	pub fn entered(self) -> OpSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OpSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OpSpanGuard {}
		}
	}
}

/// RAII guard returned by [`OpSpan::entered`].
pub struct OpSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OpSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OpSpanGuard(..)")
	}
}

/// Logs a recovered failure; storage failures at `error`, everything else at `warn`.
pub fn emit_diagnostic(kind: DiagnosticKind, detail: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		if kind.is_storage_failure() {
			tracing::error!(kind = kind.as_str(), "{detail}");
		} else {
			tracing::warn!(kind = kind.as_str(), "{detail}");
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, detail);
	}
}

/// Logs a successful mutation of a single record.
pub fn emit_update(op: PoolOp, id: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(op = op.as_str(), %id, "token record updated");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (op, id);
	}
}
