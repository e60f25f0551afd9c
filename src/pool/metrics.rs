// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::{DiagnosticKind, SelectionOutcome};

/// Thread-safe counters kept by every [`TokenPool`](crate::pool::TokenPool).
///
/// They mirror what the `tracing`/`metrics` features export, but are always on so callers
/// (and tests) can observe recovered failures without installing a subscriber.
#[derive(Debug, Default)]
pub struct PoolMetrics {
	storage_read: AtomicU64,
	storage_write: AtomicU64,
	rejected_document: AtomicU64,
	skipped_entry: AtomicU64,
	not_found: AtomicU64,
	selected: AtomicU64,
	exhausted: AtomicU64,
}
impl PoolMetrics {
	/// Returns how many diagnostics of the provided kind were reported.
	pub fn diagnostics(&self, kind: DiagnosticKind) -> u64 {
		self.diagnostic_counter(kind).load(Ordering::Relaxed)
	}

	/// Returns the number of diagnostics reported across all kinds.
	pub fn total_diagnostics(&self) -> u64 {
		[
			DiagnosticKind::StorageRead,
			DiagnosticKind::StorageWrite,
			DiagnosticKind::RejectedDocument,
			DiagnosticKind::SkippedEntry,
			DiagnosticKind::NotFound,
		]
		.into_iter()
		.map(|kind| self.diagnostics(kind))
		.sum()
	}

	/// Returns how many selections ended with the provided outcome.
	pub fn selections(&self, outcome: SelectionOutcome) -> u64 {
		self.selection_counter(outcome).load(Ordering::Relaxed)
	}

	pub(crate) fn record_diagnostic(&self, kind: DiagnosticKind) {
		self.diagnostic_counter(kind).fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_selection(&self, outcome: SelectionOutcome) {
		self.selection_counter(outcome).fetch_add(1, Ordering::Relaxed);
	}

	fn diagnostic_counter(&self, kind: DiagnosticKind) -> &AtomicU64 {
		match kind {
			DiagnosticKind::StorageRead => &self.storage_read,
			DiagnosticKind::StorageWrite => &self.storage_write,
			DiagnosticKind::RejectedDocument => &self.rejected_document,
			DiagnosticKind::SkippedEntry => &self.skipped_entry,
			DiagnosticKind::NotFound => &self.not_found,
		}
	}

	fn selection_counter(&self, outcome: SelectionOutcome) -> &AtomicU64 {
		match outcome {
			SelectionOutcome::Selected => &self.selected,
			SelectionOutcome::Exhausted => &self.exhausted,
		}
	}
}
