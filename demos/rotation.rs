//! Walks a throwaway session directory through a rotation cycle: hand out tokens, react to a
//! `429` and a `401`, then bring the rejected credential back with a replacement.

// std
use std::{env, fs, process};
// crates.io
use color_eyre::Result;
use serde_json::json;
// self
use token_pool::{
	pool::TokenPool,
	store::{FileStore, RecordStore},
	token::TokenId,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let base = env::temp_dir().join(format!("token_pool_demo_{}", process::id()));
	let store = FileStore::session(&base);

	store.write_document(&json!([
		{ "id": "primary", "token": "sk-demo-1", "owner": "ops" },
		{ "id": "backup", "token": "sk-demo-2" },
		{ "id": "legacy", "token": "sk-demo-3", "invalid": true }
	]))?;

	let pool = TokenPool::session(&base);

	for _ in 0..3 {
		let Some(record) = pool.available_token() else { break };

		if let (Some(id), Some(token)) = (record.id(), record.token()) {
			println!("Handing out {id} ({}).", token.fingerprint());
		}
	}

	let primary = TokenId::new("primary")?;
	let backup = TokenId::new("backup")?;

	println!("429 on primary: {:?}.", pool.report_response(&primary, 429));
	println!("401 on backup: {:?}.", pool.report_response(&backup, 401));
	println!("Any token left: {}.", pool.has_available_token());
	println!("Revalidating backup: {:?}.", pool.mark_valid(&backup, Some("sk-demo-2b")));

	for record in pool.list_tokens() {
		println!("{:?} -> {:?}", record.id(), record.status());
	}

	fs::remove_dir_all(&base)?;

	Ok(())
}
