//! Storage port for login attempts.

use crate::attempt::{IdentityKey, LoginAttempt};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Append-only access to recorded login attempts.
///
/// Backends report failures as plain strings which the throttle wraps into
/// [`ThrottleError::Store`] uninterpreted.
///
/// [`ThrottleError::Store`]: crate::ThrottleError::Store
#[async_trait]
pub trait AttemptStore: Send + Sync {
	/// Attempts recorded for `key` with `attempted_at >= since`, newest
	/// first.
	async fn recent_attempts(
		&self,
		key: &IdentityKey,
		since: DateTime<Utc>,
	) -> Result<Vec<LoginAttempt>, String>;

	/// Append one attempt. No other side effects.
	async fn create_attempt(&self, attempt: LoginAttempt) -> Result<(), String>;
}

/// In-memory [`AttemptStore`] keyed by identity.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use claimdesk_throttling::{
/// 	AttemptOutcome, AttemptStore, IdentityKey, LoginAttempt, MemoryAttemptStore,
/// };
///
/// # tokio_test::block_on(async {
/// let store = MemoryAttemptStore::new();
/// let key = IdentityKey::Username("msmith".to_string());
/// let attempt = LoginAttempt::new(key.clone(), AttemptOutcome::Failed, Utc::now());
/// store.create_attempt(attempt).await.unwrap();
///
/// let recent = store
/// 	.recent_attempts(&key, Utc::now() - Duration::minutes(15))
/// 	.await
/// 	.unwrap();
/// assert_eq!(recent.len(), 1);
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MemoryAttemptStore {
	attempts: Arc<RwLock<HashMap<String, Vec<LoginAttempt>>>>,
}

impl MemoryAttemptStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Total attempts recorded for `key`, regardless of age.
	pub fn attempt_count(&self, key: &IdentityKey) -> usize {
		self.attempts
			.read()
			.get(&key.storage_key())
			.map_or(0, Vec::len)
	}
}

#[async_trait]
impl AttemptStore for MemoryAttemptStore {
	async fn recent_attempts(
		&self,
		key: &IdentityKey,
		since: DateTime<Utc>,
	) -> Result<Vec<LoginAttempt>, String> {
		let attempts = self.attempts.read();
		let mut recent: Vec<LoginAttempt> = attempts
			.get(&key.storage_key())
			.map(|recorded| {
				recorded
					.iter()
					.filter(|attempt| attempt.attempted_at >= since)
					.cloned()
					.collect()
			})
			.unwrap_or_default();
		recent.sort_by(|a, b| b.attempted_at.cmp(&a.attempted_at));
		Ok(recent)
	}

	async fn create_attempt(&self, attempt: LoginAttempt) -> Result<(), String> {
		self.attempts
			.write()
			.entry(attempt.key.storage_key())
			.or_default()
			.push(attempt);
		Ok(())
	}
}
