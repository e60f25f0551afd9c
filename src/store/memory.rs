//! Thread-safe in-memory [`RecordStore`] implementation for local development and tests.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::{
	_prelude::*,
	store::{RecordStore, StoreError},
};

/// Storage backend that keeps the token document in-process for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryStore {
	document: RwLock<Option<Value>>,
	fail_writes: AtomicBool,
}
impl MemoryStore {
	/// Creates a store that already holds the provided document.
	pub fn with_document(document: Value) -> Self {
		Self { document: RwLock::new(Some(document)), fail_writes: AtomicBool::new(false) }
	}

	/// Returns a copy of the stored document, if any.
	pub fn document(&self) -> Option<Value> {
		self.document.read().clone()
	}

	/// Makes subsequent writes fail with a backend error until switched off again.
	pub fn set_fail_writes(&self, fail: bool) {
		self.fail_writes.store(fail, Ordering::Relaxed);
	}
}
impl RecordStore for MemoryStore {
	fn read_document(&self) -> Result<Option<Value>, StoreError> {
		Ok(self.document())
	}

	fn write_document(&self, document: &Value) -> Result<(), StoreError> {
		if self.fail_writes.load(Ordering::Relaxed) {
			return Err(StoreError::Backend { message: "Memory store is read-only".into() });
		}

		*self.document.write() = Some(document.clone());

		Ok(())
	}
}
