// self
use crate::_prelude::*;

/// Tunables for a [`TokenPool`](crate::pool::TokenPool).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
	/// How long [`mark_rate_limited`](crate::pool::TokenPool::mark_rate_limited) parks a token.
	pub default_rate_limit: Duration,
	/// Serializes this pool's read-modify-write cycles behind a process-local mutex.
	///
	/// Other pools or processes writing the same file still race; last writer wins.
	pub serialize_operations: bool,
}
impl PoolConfig {
	const DEFAULT_RATE_LIMIT: Duration = Duration::hours(24);

	/// Overrides the rate-limit window (defaults to 24 hours). Negative windows clamp to zero.
	pub fn with_default_rate_limit(mut self, window: Duration) -> Self {
		self.default_rate_limit = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Enables or disables the process-local operation lock (defaults to enabled).
	pub fn with_serialized_operations(mut self, enabled: bool) -> Self {
		self.serialize_operations = enabled;

		self
	}
}
impl Default for PoolConfig {
	fn default() -> Self {
		Self { default_rate_limit: Self::DEFAULT_RATE_LIMIT, serialize_operations: true }
	}
}
