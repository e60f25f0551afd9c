//! File-backed API token pool—round-robin selection across stored credentials with rate-limit
//! and invalidation bookkeeping that never takes the calling request pipeline down.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod error;
pub mod obs;
pub mod pool;
pub mod store;
pub mod token;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{env, path::PathBuf, process};
	// self
	use crate::{
		pool::{PoolConfig, TokenPool},
		store::{MemoryStore, RecordStore},
		token::TokenRecord,
	};

	/// Returns a unique path under the system temp directory for file-store tests.
	pub fn temp_session_dir(label: &str) -> PathBuf {
		let unique = format!(
			"token_pool_{label}_{}_{}",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	/// Builds a record with the provided id and credential and no lifecycle flags.
	pub fn record_fixture(id: &str, token: &str) -> TokenRecord {
		TokenRecord::new(id, token).expect("Token record fixture should use a valid identifier.")
	}

	/// Seeds an in-memory store with the provided JSON document and wraps it in a pool.
	pub fn memory_pool(document: serde_json::Value) -> (TokenPool, Arc<MemoryStore>) {
		let backend = Arc::new(MemoryStore::with_document(document));
		let store: Arc<dyn RecordStore> = backend.clone();

		(TokenPool::with_config(store, PoolConfig::default()), backend)
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{Error, Result};
}

#[cfg(test)] use color_eyre as _;
