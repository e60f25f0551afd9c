//! JSON-file [`RecordStore`] used by deployments and bots.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{RecordStore, StoreError},
};

/// Persists the token document to a JSON file, replacing it atomically on every write.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	companion_dirs: Vec<PathBuf>,
}
impl FileStore {
	/// Directory (relative to the deployment root) holding session data.
	pub const SESSION_DIR: &'static str = "session";
	/// Per-account data directory created next to the token file.
	pub const ACCOUNTS_DIR: &'static str = "accounts";
	/// File name of the token document.
	pub const TOKENS_FILE: &'static str = "tokens.json";

	/// Uses the provided file path as the token document.
	pub fn open(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), companion_dirs: Vec::new() }
	}

	/// Uses the standard session layout under `base`: `session/tokens.json`, with
	/// `session/accounts/` created alongside it.
	pub fn session(base: impl AsRef<Path>) -> Self {
		let session = base.as_ref().join(Self::SESSION_DIR);

		Self {
			path: session.join(Self::TOKENS_FILE),
			companion_dirs: vec![session.join(Self::ACCOUNTS_DIR)],
		}
	}

	/// Location of the token document.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
		fs::create_dir_all(dir).map_err(|e| StoreError::Backend {
			message: format!("Failed to create store directory {}: {e}", dir.display()),
		})
	}

	fn temp_path(&self) -> PathBuf {
		let name = self.path.file_name().and_then(|n| n.to_str()).unwrap_or(Self::TOKENS_FILE);

		self.path.with_file_name(format!(".{name}.{:016x}.tmp", rand::random::<u64>()))
	}

	fn write_temp(tmp_path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
		let mut file = File::create(tmp_path).map_err(|e| StoreError::Backend {
			message: format!("Failed to create {}: {e}", tmp_path.display()),
		})?;

		file.write_all(bytes).map_err(|e| StoreError::Backend {
			message: format!("Failed to write {}: {e}", tmp_path.display()),
		})?;
		file.sync_all().map_err(|e| StoreError::Backend {
			message: format!("Failed to sync {}: {e}", tmp_path.display()),
		})
	}
}
impl RecordStore for FileStore {
	fn prepare(&self) -> Result<(), StoreError> {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			Self::ensure_dir(parent)?;
		}
		for dir in &self.companion_dirs {
			Self::ensure_dir(dir)?;
		}

		Ok(())
	}

	fn read_document(&self) -> Result<Option<Value>, StoreError> {
		if !self.path.exists() {
			return Ok(None);
		}

		let bytes = fs::read(&self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", self.path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(None);
		}

		serde_json::from_slice(&bytes).map(Some).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", self.path.display()),
		})
	}

	fn write_document(&self, document: &Value) -> Result<(), StoreError> {
		self.prepare()?;

		let serialized =
			serde_json::to_vec_pretty(document).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize token document: {e}"),
			})?;
		let tmp_path = self.temp_path();

		if let Err(e) = Self::write_temp(&tmp_path, &serialized) {
			let _ = fs::remove_file(&tmp_path);

			return Err(e);
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| {
			let _ = fs::remove_file(&tmp_path);

			let message = format!("Failed to replace {}: {e}", self.path.display());

			StoreError::Backend { message }
		})
	}
}
