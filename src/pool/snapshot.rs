//! In-flight view of the token document used by one read-modify-write cycle.

// self
use crate::{
	_prelude::*,
	token::{TokenId, TokenRecord},
};

/// Stored object entries in storage order.
#[derive(Clone, Debug, Default)]
pub(crate) struct Snapshot {
	records: Vec<TokenRecord>,
}
impl Snapshot {
	pub(crate) fn new(records: Vec<TokenRecord>) -> Self {
		Self { records }
	}

	pub(crate) fn records(&self) -> &[TokenRecord] {
		&self.records
	}

	pub(crate) fn into_records(self) -> Vec<TokenRecord> {
		self.records
	}

	/// First record whose stored `id` matches.
	pub(crate) fn find_mut(&mut self, id: &TokenId) -> Option<&mut TokenRecord> {
		self.records.iter_mut().find(|record| record.has_id(id))
	}

	/// Removes every record carrying the identifier. Returns how many went.
	pub(crate) fn remove(&mut self, id: &TokenId) -> usize {
		let before = self.records.len();

		self.records.retain(|record| !record.has_id(id));

		before - self.records.len()
	}

	pub(crate) fn to_document(&self) -> Value {
		Value::Array(self.records.iter().cloned().map(Value::from).collect())
	}
}
