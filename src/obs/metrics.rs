// self
use crate::obs::{DiagnosticKind, SelectionOutcome};

/// Records a diagnostic via the global metrics recorder (when enabled).
pub fn record_diagnostic(kind: DiagnosticKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("token_pool_diagnostic_total", "kind" => kind.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = kind;
	}
}

/// Records a selection outcome via the global metrics recorder (when enabled).
pub fn record_selection(outcome: SelectionOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("token_pool_selection_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
