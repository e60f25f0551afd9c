//! Round-robin token pool over a [`RecordStore`].
//!
//! Every operation is one self-contained cycle: read the document, optionally mutate it, write
//! it back. Nothing is cached between calls except the rotation cursor. Failures never escape
//! the lenient operations; they become a diagnostic (see [`crate::obs`]) plus a no-op, so the
//! request pipeline that asks for a credential cannot be taken down by bookkeeping.

mod config;
mod metrics;
mod response;
mod snapshot;

pub use config::PoolConfig;
pub use metrics::PoolMetrics;
pub use response::{MarkOutcome, RemoveOutcome, ResponseClass, ResponseVerdict};

// std
use std::path::Path;
// crates.io
use parking_lot::MutexGuard;
use time::PrimitiveDateTime;
// self
use crate::{
	_prelude::*,
	obs::{self, DiagnosticKind, OpSpan, PoolOp, SelectionOutcome},
	pool::snapshot::Snapshot,
	store::{FileStore, RecordStore},
	token::{TokenId, TokenRecord, TokenStatus},
};

/// Number of records in each logical state at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
	/// Records that may be handed out.
	pub available: usize,
	/// Records parked until a future reset instant.
	pub rate_limited: usize,
	/// Records flagged invalid.
	pub invalid: usize,
}

/// Process-local façade over the stored token list.
pub struct TokenPool {
	store: Arc<dyn RecordStore>,
	config: PoolConfig,
	cursor: Mutex<usize>,
	op_lock: Mutex<()>,
	metrics: PoolMetrics,
}
impl TokenPool {
	/// Creates a pool with the default configuration.
	pub fn new(store: Arc<dyn RecordStore>) -> Self {
		Self::with_config(store, PoolConfig::default())
	}

	/// Creates a pool with an explicit configuration. The cursor starts at zero.
	pub fn with_config(store: Arc<dyn RecordStore>, config: PoolConfig) -> Self {
		Self {
			store,
			config,
			cursor: Mutex::new(0),
			op_lock: Mutex::new(()),
			metrics: PoolMetrics::default(),
		}
	}

	/// Creates a pool over the standard `session/tokens.json` layout under `base`.
	pub fn session(base: impl AsRef<Path>) -> Self {
		Self::new(Arc::new(FileStore::session(base)))
	}

	/// Active configuration.
	pub fn config(&self) -> &PoolConfig {
		&self.config
	}

	/// Counters for every diagnostic and selection this pool produced.
	pub fn diagnostics(&self) -> &PoolMetrics {
		&self.metrics
	}

	/// Current rotation offset into the available subset.
	pub fn cursor(&self) -> usize {
		*self.cursor.lock()
	}

	/// Reads every stored object in storage order, whatever fields it carries.
	///
	/// A missing document yields an empty list. An unreadable or non-array document also
	/// yields an empty list and reports a diagnostic; entries that are not objects are skipped
	/// the same way.
	pub fn load(&self) -> Vec<TokenRecord> {
		let _span = OpSpan::new(PoolOp::Load).entered();
		let _guard = self.lock_operations();

		self.read_snapshot().into_records()
	}

	/// Strict counterpart of [`load`](Self::load) that returns the first problem instead of
	/// degrading.
	pub fn try_load(&self) -> Result<Vec<TokenRecord>> {
		let _span = OpSpan::new(PoolOp::Load).entered();
		let _guard = self.lock_operations();

		self.store.prepare()?;

		let entries = match self.store.read_document()? {
			None => return Ok(Vec::new()),
			Some(Value::Array(entries)) => entries,
			Some(other) => return Err(Error::rejected(&other)),
		};

		entries
			.into_iter()
			.enumerate()
			.map(|(index, entry)| decode_entry(index, entry))
			.collect()
	}

	/// Same as [`load`](Self::load); the full unfiltered list as currently persisted.
	pub fn list_tokens(&self) -> Vec<TokenRecord> {
		self.load()
	}

	/// Replaces the stored list with the provided records, in order.
	///
	/// Write failures are reported as diagnostics, never returned.
	pub fn save(&self, records: &[TokenRecord]) {
		let _span = OpSpan::new(PoolOp::Save).entered();
		let _guard = self.lock_operations();

		self.write_snapshot(&Snapshot::new(records.to_vec()));
	}

	/// Replaces the stored document with an arbitrary JSON value.
	///
	/// Anything other than an array is rejected with a diagnostic and nothing is written.
	/// Non-object elements are dropped; object elements are written verbatim, in order.
	pub fn save_document(&self, document: Value) {
		let _span = OpSpan::new(PoolOp::Save).entered();
		let _guard = self.lock_operations();

		self.write_value(document);
	}

	/// Hands out the next available record, rotating through the available subset.
	pub fn available_token(&self) -> Option<TokenRecord> {
		self.available_token_at(OffsetDateTime::now_utc())
	}

	/// Same as [`available_token`](Self::available_token) with an explicit "now".
	///
	/// The cursor indexes the available subset as computed for this call, so rotation is only
	/// fair while that subset stays the same. With nothing available the cursor is left alone.
	pub fn available_token_at(&self, now: OffsetDateTime) -> Option<TokenRecord> {
		let _span = OpSpan::new(PoolOp::Select).entered();
		let _guard = self.lock_operations();
		let available = self
			.read_snapshot()
			.into_records()
			.into_iter()
			.filter(|record| record.is_available_at(now))
			.collect::<Vec<_>>();

		if available.is_empty() {
			self.record_selection(SelectionOutcome::Exhausted);

			return None;
		}

		let len = available.len();
		let index = {
			let mut cursor = self.cursor.lock();
			let index = *cursor % len;

			*cursor = (index + 1) % len;

			index
		};
		let selected = available.into_iter().nth(index);

		self.record_selection(SelectionOutcome::Selected);

		selected
	}

	/// Returns `true` if at least one record is available right now.
	pub fn has_available_token(&self) -> bool {
		self.has_available_token_at(OffsetDateTime::now_utc())
	}

	/// Same as [`has_available_token`](Self::has_available_token) with an explicit "now".
	pub fn has_available_token_at(&self, now: OffsetDateTime) -> bool {
		let _span = OpSpan::new(PoolOp::Query).entered();
		let _guard = self.lock_operations();

		self.read_snapshot().records().iter().any(|record| record.is_available_at(now))
	}

	/// Tallies records per logical state at the provided instant.
	pub fn status_counts(&self, now: OffsetDateTime) -> StatusCounts {
		let _span = OpSpan::new(PoolOp::Query).entered();
		let _guard = self.lock_operations();

		let snapshot = self.read_snapshot();

		snapshot.records().iter().fold(StatusCounts::default(), |mut counts, record| {
			match record.status_at(now) {
				TokenStatus::Available => counts.available += 1,
				TokenStatus::RateLimited { .. } => counts.rate_limited += 1,
				TokenStatus::Invalid => counts.invalid += 1,
			}

			counts
		})
	}

	/// Parks the record for the configured window (24 hours by default).
	pub fn mark_rate_limited(&self, id: &TokenId) -> MarkOutcome {
		self.mark_rate_limited_for(id, self.config.default_rate_limit)
	}

	/// Parks the record for the provided window, starting now.
	pub fn mark_rate_limited_for(&self, id: &TokenId, window: Duration) -> MarkOutcome {
		self.mark_rate_limited_at(id, window, OffsetDateTime::now_utc())
	}

	/// Parks the record until `now + window`.
	///
	/// A window reaching past the representable range parks the record until the latest
	/// representable instant; one reaching before it parks the record until `now`.
	pub fn mark_rate_limited_at(
		&self,
		id: &TokenId,
		window: Duration,
		now: OffsetDateTime,
	) -> MarkOutcome {
		let until = now.checked_add(window).unwrap_or_else(|| {
			if window.is_negative() { now } else { PrimitiveDateTime::MAX.assume_utc() }
		});

		self.update(PoolOp::MarkRateLimited, id, |record| {
			record.rate_limit_until(until).map_err(Error::from)
		})
	}

	/// Flags the record as permanently unusable until [`mark_valid`](Self::mark_valid).
	pub fn mark_invalid(&self, id: &TokenId) -> MarkOutcome {
		self.update(PoolOp::MarkInvalid, id, |record| {
			record.invalidate();

			Ok(())
		})
	}

	/// Clears the invalid flag and the reset instant, optionally swapping in a new credential.
	pub fn mark_valid(&self, id: &TokenId, replacement: Option<&str>) -> MarkOutcome {
		self.update(PoolOp::MarkValid, id, |record| {
			record.revalidate(replacement);

			Ok(())
		})
	}

	/// Deletes every entry carrying the identifier.
	///
	/// The remaining sequence is always written back, even when nothing matched or the stored
	/// document was unreadable (which then becomes an empty array).
	pub fn remove_token(&self, id: &TokenId) -> RemoveOutcome {
		let _span = OpSpan::new(PoolOp::Remove).entered();
		let _guard = self.lock_operations();
		let mut snapshot = self.read_snapshot();
		let removed = snapshot.remove(id);
		let written = self.write_snapshot(&snapshot);

		if removed == 0 {
			self.diagnose(
				DiagnosticKind::NotFound,
				&format_args!("No token with id {id} to remove"),
			);

			return RemoveOutcome::Missing;
		}
		if !written {
			return RemoveOutcome::WriteFailed;
		}

		obs::emit_update(PoolOp::Remove, id);

		RemoveOutcome::Removed
	}

	/// Alias of [`remove_token`](Self::remove_token) for callers pruning rejected credentials.
	pub fn remove_invalid_token(&self, id: &TokenId) -> RemoveOutcome {
		self.remove_token(id)
	}

	/// Applies the bookkeeping implied by a downstream HTTP status for the token used.
	///
	/// `429` parks the token for the configured window; `401` and `403` flag it invalid.
	pub fn report_response(&self, id: &TokenId, status: u16) -> ResponseVerdict {
		let _span = OpSpan::new(PoolOp::ReportResponse).entered();

		match ResponseClass::of(status) {
			ResponseClass::RateLimited => ResponseVerdict::RateLimited(self.mark_rate_limited(id)),
			ResponseClass::Rejected => ResponseVerdict::Invalid(self.mark_invalid(id)),
			ResponseClass::Neutral => ResponseVerdict::Untouched,
		}
	}

	fn update(
		&self,
		op: PoolOp,
		id: &TokenId,
		apply: impl FnOnce(&mut TokenRecord) -> Result<()>,
	) -> MarkOutcome {
		let _span = OpSpan::new(op).entered();
		let _guard = self.lock_operations();
		let mut snapshot = self.read_snapshot();
		let Some(record) = snapshot.find_mut(id) else {
			self.diagnose(
				DiagnosticKind::NotFound,
				&format_args!("No token with id {id} to {op}"),
			);

			return MarkOutcome::Missing;
		};

		if let Err(e) = apply(record) {
			self.diagnose(DiagnosticKind::StorageWrite, &e);

			return MarkOutcome::WriteFailed;
		}
		if !self.write_snapshot(&snapshot) {
			return MarkOutcome::WriteFailed;
		}

		obs::emit_update(op, id);

		MarkOutcome::Updated
	}

	fn lock_operations(&self) -> Option<MutexGuard<'_, ()>> {
		self.config.serialize_operations.then(|| self.op_lock.lock())
	}

	fn read_snapshot(&self) -> Snapshot {
		if let Err(e) = self.store.prepare() {
			self.diagnose(DiagnosticKind::StorageRead, &e);
		}

		let entries = match self.store.read_document() {
			Ok(None) => return Snapshot::default(),
			Ok(Some(Value::Array(entries))) => entries,
			Ok(Some(other)) => {
				self.diagnose(DiagnosticKind::RejectedDocument, &Error::rejected(&other));

				return Snapshot::default();
			},
			Err(e) => {
				self.diagnose(DiagnosticKind::StorageRead, &e);

				return Snapshot::default();
			},
		};
		let records = entries
			.into_iter()
			.enumerate()
			.filter_map(|(index, entry)| match decode_entry(index, entry) {
				Ok(record) => Some(record),
				Err(e) => {
					self.diagnose(DiagnosticKind::SkippedEntry, &e);

					None
				},
			})
			.collect();

		Snapshot::new(records)
	}

	fn write_snapshot(&self, snapshot: &Snapshot) -> bool {
		self.write_value(snapshot.to_document())
	}

	/// Returns `true` once the document reached storage.
	fn write_value(&self, document: Value) -> bool {
		let entries = match document {
			Value::Array(entries) => entries,
			other => {
				self.diagnose(DiagnosticKind::RejectedDocument, &Error::rejected(&other));

				return false;
			},
		};
		let objects = entries.into_iter().filter(Value::is_object).collect();

		match self.store.write_document(&Value::Array(objects)) {
			Ok(()) => true,
			Err(e) => {
				self.diagnose(DiagnosticKind::StorageWrite, &e);

				false
			},
		}
	}

	fn diagnose(&self, kind: DiagnosticKind, detail: &dyn Display) {
		self.metrics.record_diagnostic(kind);
		obs::record_diagnostic(kind);
		obs::emit_diagnostic(kind, detail);
	}

	fn record_selection(&self, outcome: SelectionOutcome) {
		self.metrics.record_selection(outcome);
		obs::record_selection(outcome);
	}
}
impl Debug for TokenPool {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPool")
			.field("config", &self.config)
			.field("cursor", &self.cursor())
			.field("metrics", &self.metrics)
			.finish_non_exhaustive()
	}
}

fn decode_entry(index: usize, entry: Value) -> Result<TokenRecord> {
	serde_path_to_error::deserialize(entry).map_err(|source| Error::Decode { index, source })
}

#[cfg(test)]
mod tests {
	// std
	use std::thread;
	// crates.io
	use serde_json::json;
	use time::macros;
	// self
	use super::*;
	use crate::{_preludet::*, store::MemoryStore, token::ResetAt};

	fn id(value: &str) -> TokenId {
		TokenId::new(value).expect("Identifier fixture should be valid.")
	}

	fn picked_id(record: Option<TokenRecord>) -> String {
		record
			.and_then(|record| record.id())
			.expect("A token with an identifier should be available.")
			.to_string()
	}

	#[test]
	fn rotation_visits_each_available_record_once() {
		let (pool, _) = memory_pool(json!([
			{ "id": "a", "token": "t1" },
			{ "id": "b", "token": "t2", "invalid": true },
			{ "id": "c", "token": "t3" },
			{ "id": "d", "token": "t4", "resetAt": "2999-01-01T00:00:00.000Z" },
			{ "id": "e", "token": "t5" }
		]));
		let now = macros::datetime!(2025-06-01 00:00 UTC);
		let picked = (0..6).map(|_| picked_id(pool.available_token_at(now))).collect::<Vec<_>>();

		assert_eq!(picked, ["a", "c", "e", "a", "c", "e"]);
		assert_eq!(pool.diagnostics().selections(SelectionOutcome::Selected), 6);
	}

	#[test]
	fn exhausted_pool_leaves_cursor_alone() {
		let (pool, _) = memory_pool(json!([
			{ "id": "a", "token": "t1" },
			{ "id": "b", "token": "t2" }
		]));
		let now = macros::datetime!(2025-06-01 00:00 UTC);

		pool.available_token_at(now).expect("First token should be available.");

		assert_eq!(pool.cursor(), 1);

		pool.mark_invalid(&id("a"));
		pool.mark_invalid(&id("b"));

		assert!(pool.available_token_at(now).is_none());
		assert!(!pool.has_available_token_at(now));
		assert_eq!(pool.cursor(), 1);
		assert_eq!(pool.diagnostics().selections(SelectionOutcome::Exhausted), 1);
	}

	#[test]
	fn cursor_wraps_when_available_set_shrinks() {
		let (pool, _) = memory_pool(json!([
			{ "id": "a", "token": "t1" },
			{ "id": "b", "token": "t2" },
			{ "id": "c", "token": "t3" }
		]));
		let now = macros::datetime!(2025-06-01 00:00 UTC);

		pool.available_token_at(now);
		pool.available_token_at(now);

		assert_eq!(pool.cursor(), 2);

		pool.mark_invalid(&id("c"));

		assert_eq!(picked_id(pool.available_token_at(now)), "a");
		assert_eq!(pool.cursor(), 1);
	}

	#[test]
	fn concurrent_selection_hands_out_each_record_once() {
		const WORKERS: usize = 8;

		for serialized in [true, false] {
			let document =
				(0..WORKERS).map(|n| json!({ "id": n, "token": format!("t{n}") })).collect();
			let store: Arc<dyn RecordStore> =
				Arc::new(MemoryStore::with_document(Value::Array(document)));
			let pool = TokenPool::with_config(
				store,
				PoolConfig::default().with_serialized_operations(serialized),
			);
			let mut picked = thread::scope(|scope| {
				let workers = (0..WORKERS)
					.map(|_| scope.spawn(|| picked_id(pool.available_token())))
					.collect::<Vec<_>>();

				workers
					.into_iter()
					.map(|worker| worker.join().expect("Selection worker should not panic."))
					.collect::<Vec<_>>()
			});

			picked.sort();

			assert_eq!(
				picked,
				(0..WORKERS).map(|n| n.to_string()).collect::<Vec<_>>(),
				"serialize_operations = {serialized}"
			);
			assert_eq!(pool.cursor(), 0);
		}
	}

	#[test]
	fn rate_limit_expires_with_simulated_time() {
		let (pool, _) = memory_pool(json!([{ "id": "a", "token": "t1" }]));
		let now = macros::datetime!(2025-06-01 00:00 UTC);

		assert_eq!(
			pool.mark_rate_limited_at(&id("a"), Duration::hours(1), now),
			MarkOutcome::Updated
		);
		assert!(!pool.has_available_token_at(now));
		assert!(!pool.has_available_token_at(now + Duration::minutes(59)));
		assert!(pool.has_available_token_at(now + Duration::hours(1)));
		assert_eq!(
			pool.status_counts(now),
			StatusCounts { available: 0, rate_limited: 1, invalid: 0 }
		);
	}

	#[test]
	fn oversized_windows_clamp_instead_of_overflowing() {
		let (pool, backend) = memory_pool(json!([{ "id": "a", "token": "t1" }]));
		let now = macros::datetime!(2025-06-01 00:00 UTC);

		assert_eq!(
			pool.mark_rate_limited_for(&id("a"), Duration::hours(i64::MAX / 3_600)),
			MarkOutcome::Updated
		);

		let stored = backend.document().expect("Document should exist.");

		assert_eq!(stored[0]["resetAt"], json!("9999-12-31T23:59:59.999Z"));
		assert!(!pool.has_available_token_at(now));

		assert_eq!(
			pool.mark_rate_limited_at(&id("a"), Duration::MIN, now),
			MarkOutcome::Updated
		);
		assert!(pool.has_available_token_at(now));

		let oversized = TokenPool::with_config(
			Arc::new(MemoryStore::with_document(json!([{ "id": "a", "token": "t1" }]))),
			PoolConfig::default().with_default_rate_limit(Duration::MAX),
		);

		assert_eq!(oversized.mark_rate_limited(&id("a")), MarkOutcome::Updated);
		assert!(!oversized.has_available_token());
	}

	#[test]
	fn default_rate_limit_follows_config() {
		let store: Arc<dyn RecordStore> =
			Arc::new(MemoryStore::with_document(json!([{ "id": "a", "token": "t1" }])));
		let pool = TokenPool::with_config(
			store,
			PoolConfig::default().with_default_rate_limit(Duration::ZERO),
		);

		assert_eq!(pool.mark_rate_limited(&id("a")), MarkOutcome::Updated);
		assert!(pool.has_available_token());
	}

	#[test]
	fn unknown_ids_report_and_skip_the_write() {
		let document = json!([{ "id": "a", "token": "t1" }]);
		let (pool, backend) = memory_pool(document.clone());

		assert_eq!(pool.mark_rate_limited(&id("x")), MarkOutcome::Missing);
		assert_eq!(pool.mark_invalid(&id("x")), MarkOutcome::Missing);
		assert_eq!(pool.mark_valid(&id("x"), Some("new")), MarkOutcome::Missing);
		assert_eq!(backend.document(), Some(document));
		assert_eq!(pool.diagnostics().diagnostics(DiagnosticKind::NotFound), 3);
	}

	#[test]
	fn remove_is_idempotent() {
		let (pool, backend) = memory_pool(json!([
			{ "id": "a", "token": "t1" },
			{ "id": "b", "token": "t2" }
		]));

		assert_eq!(pool.remove_token(&id("a")), RemoveOutcome::Removed);

		let after_first = backend.document();

		assert_eq!(pool.remove_invalid_token(&id("a")), RemoveOutcome::Missing);
		assert_eq!(backend.document(), after_first);
		assert_eq!(pool.diagnostics().diagnostics(DiagnosticKind::NotFound), 1);
		assert_eq!(pool.list_tokens().len(), 1);
	}

	#[test]
	fn remove_rewrites_unreadable_document_as_empty() {
		let (pool, backend) = memory_pool(json!({ "tokens": [] }));

		assert_eq!(pool.remove_token(&id("a")), RemoveOutcome::Missing);
		assert_eq!(backend.document(), Some(json!([])));
		assert_eq!(pool.diagnostics().diagnostics(DiagnosticKind::RejectedDocument), 1);
		assert_eq!(pool.diagnostics().diagnostics(DiagnosticKind::NotFound), 1);
	}

	#[test]
	fn listing_keeps_every_object_whatever_its_fields() {
		let (pool, _) = memory_pool(json!([
			{ "id": "a", "token": "t1" },
			{ "id": "b", "token": "t2", "resetAt": "Wed, 01 Jan 2020 00:00:00 GMT" },
			{ "id": "c", "token": "t3", "invalid": "yes" },
			{ "id": "d", "token": "t4", "resetAt": "whenever" },
			{ "note": "no id or token" },
			42
		]));
		let now = macros::datetime!(2025-06-01 00:00 UTC);
		let listed = pool.list_tokens();

		assert_eq!(listed.len(), 5);
		assert_eq!(listed[4].id(), None);
		assert_eq!(pool.diagnostics().diagnostics(DiagnosticKind::SkippedEntry), 1);
		assert_eq!(listed[2].status_at(now), TokenStatus::Invalid);
		assert_eq!(listed[3].status_at(now), TokenStatus::RateLimited { until: None });
		assert_eq!(picked_id(pool.available_token_at(now)).as_str(), "a");
	}

	#[test]
	fn mark_valid_repairs_unreadable_reset_at() {
		let (pool, backend) = memory_pool(json!([
			{ "id": "b", "token": "t2", "resetAt": "next week", "owner": "ops" }
		]));
		let now = macros::datetime!(2025-06-01 00:00 UTC);

		assert!(!pool.has_available_token_at(now));
		assert_eq!(pool.mark_valid(&id("b"), None), MarkOutcome::Updated);
		assert_eq!(
			backend.document(),
			Some(json!([
				{ "id": "b", "token": "t2", "resetAt": null, "owner": "ops", "invalid": false }
			]))
		);
		assert!(pool.has_available_token_at(now));
	}

	#[test]
	fn bare_dates_park_until_utc_midnight() {
		let (pool, _) = memory_pool(json!([{ "id": "b", "token": "t2", "resetAt": "2030-01-01" }]));

		assert!(!pool.has_available_token_at(macros::datetime!(2029-12-31 23:59 UTC)));
		assert!(pool.has_available_token_at(macros::datetime!(2030-01-01 00:00 UTC)));
		assert_eq!(
			pool.load()[0].reset_at(),
			ResetAt::At(macros::datetime!(2030-01-01 00:00 UTC))
		);
	}

	#[test]
	fn mutations_touch_only_the_targeted_object() {
		let (pool, backend) = memory_pool(json!([
			{ "id": "a", "token": "t1", "owner": "ops" },
			{ "id": "broken", "invalid": "yes", "resetAt": 0 },
			42
		]));

		assert_eq!(pool.mark_invalid(&id("a")), MarkOutcome::Updated);

		let stored = backend.document().expect("Document should still exist.");

		assert_eq!(stored[0]["invalid"], json!(true));
		assert_eq!(stored[0]["owner"], json!("ops"));
		assert_eq!(stored[1], json!({ "id": "broken", "invalid": "yes", "resetAt": 0 }));
		assert_eq!(stored.as_array().map(Vec::len), Some(2), "Non-objects are dropped on write.");
		assert_eq!(pool.diagnostics().diagnostics(DiagnosticKind::SkippedEntry), 1);
		assert_eq!(pool.mark_valid(&id("broken"), Some("t9")), MarkOutcome::Updated);
	}

	#[test]
	fn numeric_ids_match_by_value() {
		let (pool, _) = memory_pool(json!([{ "id": 7.0, "token": "t1" }]));

		assert_eq!(pool.mark_invalid(&TokenId::numeric(7)), MarkOutcome::Updated);
		assert_eq!(pool.mark_invalid(&id("7")), MarkOutcome::Missing);
	}

	#[test]
	fn save_document_rejects_non_arrays_and_filters_non_objects() {
		let (pool, backend) = memory_pool(json!([{ "id": "a", "token": "t1" }]));

		pool.save_document(json!({ "id": "a" }));

		assert_eq!(backend.document(), Some(json!([{ "id": "a", "token": "t1" }])));
		assert_eq!(pool.diagnostics().diagnostics(DiagnosticKind::RejectedDocument), 1);

		pool.save_document(json!([null, { "id": "b", "token": "t2" }, "x", [1]]));

		assert_eq!(backend.document(), Some(json!([{ "id": "b", "token": "t2" }])));
	}

	#[test]
	fn write_failures_are_reported_not_raised() {
		let (pool, backend) = memory_pool(json!([
			{ "id": "a", "token": "t1" },
			{ "id": "b", "token": "t2" }
		]));

		backend.set_fail_writes(true);

		assert_eq!(pool.mark_invalid(&id("a")), MarkOutcome::WriteFailed);
		assert_eq!(pool.remove_token(&id("b")), RemoveOutcome::WriteFailed);
		assert_eq!(
			pool.report_response(&id("a"), 429),
			ResponseVerdict::RateLimited(MarkOutcome::WriteFailed)
		);
		assert_eq!(pool.diagnostics().diagnostics(DiagnosticKind::StorageWrite), 3);
		assert_eq!(pool.list_tokens().len(), 2);
		assert!(pool.has_available_token());
	}

	#[test]
	fn try_load_surfaces_decode_path() {
		let (pool, _) = memory_pool(json!([
			{ "id": "a", "token": "t1", "resetAt": "soon" },
			"stray"
		]));
		let error = pool.try_load().expect_err("Non-object entry should fail strict load.");

		assert!(matches!(error, Error::Decode { index: 1, .. }));
		assert!(error.to_string().starts_with("Entry 1 is not a valid token record"), "{error}");
		assert_eq!(pool.load().len(), 1);
	}

	#[test]
	fn report_response_maps_statuses() {
		let (pool, _) = memory_pool(json!([
			{ "id": "a", "token": "t1" },
			{ "id": "b", "token": "t2" }
		]));

		assert_eq!(
			pool.report_response(&id("a"), 429),
			ResponseVerdict::RateLimited(MarkOutcome::Updated)
		);
		assert_eq!(
			pool.report_response(&id("b"), 401),
			ResponseVerdict::Invalid(MarkOutcome::Updated)
		);
		assert_eq!(pool.report_response(&id("b"), 500), ResponseVerdict::Untouched);
		assert_eq!(
			pool.report_response(&id("zz"), 403),
			ResponseVerdict::Invalid(MarkOutcome::Missing)
		);

		let counts = pool.status_counts(OffsetDateTime::now_utc());

		assert_eq!(counts, StatusCounts { available: 0, rate_limited: 1, invalid: 1 });
	}

	#[test]
	fn pool_debug_hides_store() {
		let (pool, _) = memory_pool(json!([]));
		let rendered = format!("{pool:?}");

		assert!(rendered.starts_with("TokenPool {"));
		assert!(rendered.contains("cursor: 0"));
	}
}
