//! Storage contracts and built-in backends for the raw token document.
//!
//! Backends only move a JSON document in and out of storage. Decoding records, filtering
//! entries, and downgrading failures into diagnostics happen in [`crate::pool`], so every
//! backend shares the same leniency rules.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Storage backend contract implemented by token document stores.
pub trait RecordStore
where
	Self: Send + Sync,
{
	/// Ensures the storage location exists before it is read or written.
	fn prepare(&self) -> Result<(), StoreError> {
		Ok(())
	}

	/// Reads the stored document, returning `None` when nothing has been stored yet.
	fn read_document(&self) -> Result<Option<Value>, StoreError>;

	/// Fully replaces the stored document.
	fn write_document(&self, document: &Value) -> Result<(), StoreError>;
}

/// Error type produced by [`RecordStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage medium.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
impl StoreError {
	/// Returns `true` for failures caused by unreadable document contents.
	pub fn is_serialization(&self) -> bool {
		matches!(self, Self::Serialization { .. })
	}
}
