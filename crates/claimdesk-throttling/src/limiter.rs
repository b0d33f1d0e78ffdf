//! Login rate throttle over an attempt store.

use crate::attempt::{AttemptOutcome, IdentityKey, LoginAttempt};
use crate::store::{AttemptStore, MemoryAttemptStore};
use crate::window::{self, RateLimitDecision, RateQuota};
use crate::{ThrottleError, ThrottleResult};
use claimdesk_core::time_provider::{SystemTimeProvider, TimeProvider};
use std::sync::Arc;

/// Per-dimension quotas for login throttling.
///
/// A login is denied when either the address or the account dimension
/// denies; the two quotas are configured independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginThrottlePolicy {
	/// Quota applied per remote address.
	pub ip: RateQuota,
	/// Quota applied per targeted username.
	pub username: RateQuota,
}

impl LoginThrottlePolicy {
	pub fn new(ip: RateQuota, username: RateQuota) -> Self {
		Self { ip, username }
	}
}

/// Sliding-window throttle for authentication attempts.
///
/// Reads recent attempts, decides, and (separately) records — nothing else.
/// No state is kept between calls; a restart or failover loses nothing.
///
/// # Examples
///
/// ```
/// use claimdesk_throttling::{IdentityKey, LoginRateThrottle, RateQuota};
///
/// # tokio_test::block_on(async {
/// let throttle = LoginRateThrottle::new();
/// let key = IdentityKey::Username("msmith".to_string());
/// let quota = RateQuota::per_minutes(5, 15).unwrap();
///
/// let decision = throttle.check_limit(&key, quota).await.unwrap();
/// assert!(decision.is_allowed());
/// # });
/// ```
pub struct LoginRateThrottle<S: AttemptStore = MemoryAttemptStore, T: TimeProvider = SystemTimeProvider>
{
	store: Arc<S>,
	time_provider: Arc<T>,
}

impl LoginRateThrottle<MemoryAttemptStore> {
	/// Creates a throttle over a fresh in-memory store and the system clock.
	pub fn new() -> Self {
		Self::with_store(Arc::new(MemoryAttemptStore::new()))
	}
}

impl Default for LoginRateThrottle<MemoryAttemptStore> {
	fn default() -> Self {
		Self::new()
	}
}

impl<S: AttemptStore> LoginRateThrottle<S> {
	/// Creates a throttle over a custom attempt store.
	pub fn with_store(store: Arc<S>) -> Self {
		Self::with_time_provider(store, Arc::new(SystemTimeProvider::new()))
	}
}

impl<S: AttemptStore, T: TimeProvider> LoginRateThrottle<S, T> {
	/// Creates a throttle with a custom store and time provider.
	pub fn with_time_provider(store: Arc<S>, time_provider: Arc<T>) -> Self {
		Self {
			store,
			time_provider,
		}
	}

	/// May `key` attempt again right now, under `quota`?
	///
	/// Counts the attempts recorded for `key` within the last
	/// `quota.window()`. At or over the quota the decision carries the
	/// moment the oldest in-window attempt expires; under it, the number of
	/// attempts left.
	///
	/// # Errors
	///
	/// Returns [`ThrottleError::Store`] when the attempt store fails.
	pub async fn check_limit(
		&self,
		key: &IdentityKey,
		quota: RateQuota,
	) -> ThrottleResult<RateLimitDecision> {
		let now = self.time_provider.now();
		let since = now - quota.window();
		let attempts = self
			.store
			.recent_attempts(key, since)
			.await
			.map_err(ThrottleError::Store)?;
		let timestamps: Vec<_> = attempts.iter().map(|attempt| attempt.attempted_at).collect();

		let decision = window::evaluate(&timestamps, quota);
		if let RateLimitDecision::Denied { retry_after } = decision {
			tracing::debug!(key = %key, %retry_after, "login attempt denied by rate limit");
		}
		Ok(decision)
	}

	/// Append `attempt` to the store. No business logic, no side effects
	/// beyond the write.
	///
	/// # Errors
	///
	/// Returns [`ThrottleError::Store`] when the attempt store fails.
	pub async fn record_attempt(&self, attempt: LoginAttempt) -> ThrottleResult<()> {
		self.store
			.create_attempt(attempt)
			.await
			.map_err(ThrottleError::Store)
	}

	/// Record an attempt against `key`, stamped with the current time.
	pub async fn record(&self, key: IdentityKey, outcome: AttemptOutcome) -> ThrottleResult<()> {
		let attempt = LoginAttempt::new(key, outcome, self.time_provider.now());
		self.record_attempt(attempt).await
	}

	/// Evaluate both login dimensions for one credential pair.
	///
	/// Denied when either dimension is, reporting the later of the two
	/// retry moments; allowed with the smaller remaining count otherwise.
	pub async fn check_login(
		&self,
		ip: &str,
		username: &str,
		policy: &LoginThrottlePolicy,
	) -> ThrottleResult<RateLimitDecision> {
		let by_address = self
			.check_limit(&IdentityKey::Ip(ip.to_string()), policy.ip)
			.await?;
		let by_account = self
			.check_limit(&IdentityKey::Username(username.to_string()), policy.username)
			.await?;
		Ok(combine(by_address, by_account))
	}

	/// Record one attempt per dimension, sharing a single timestamp.
	pub async fn record_login(
		&self,
		ip: &str,
		username: &str,
		outcome: AttemptOutcome,
	) -> ThrottleResult<()> {
		let attempted_at = self.time_provider.now();
		self.record_attempt(LoginAttempt::new(
			IdentityKey::Ip(ip.to_string()),
			outcome,
			attempted_at,
		))
		.await?;
		self.record_attempt(LoginAttempt::new(
			IdentityKey::Username(username.to_string()),
			outcome,
			attempted_at,
		))
		.await
	}
}

/// The stricter of two per-dimension decisions.
fn combine(a: RateLimitDecision, b: RateLimitDecision) -> RateLimitDecision {
	match (a, b) {
		(
			RateLimitDecision::Denied { retry_after: first },
			RateLimitDecision::Denied {
				retry_after: second,
			},
		) => RateLimitDecision::Denied {
			retry_after: first.max(second),
		},
		(denied @ RateLimitDecision::Denied { .. }, _)
		| (_, denied @ RateLimitDecision::Denied { .. }) => denied,
		(
			RateLimitDecision::Allowed {
				attempts_remaining: first,
			},
			RateLimitDecision::Allowed {
				attempts_remaining: second,
			},
		) => RateLimitDecision::Allowed {
			attempts_remaining: first.min(second),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Duration, TimeZone, Utc};
	use claimdesk_core::time_provider::MockTimeProvider;

	fn frozen_clock() -> Arc<MockTimeProvider> {
		Arc::new(MockTimeProvider::new(
			Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
		))
	}

	fn throttle_with_clock(
		clock: Arc<MockTimeProvider>,
	) -> LoginRateThrottle<MemoryAttemptStore, MockTimeProvider> {
		LoginRateThrottle::with_time_provider(Arc::new(MemoryAttemptStore::new()), clock)
	}

	fn key() -> IdentityKey {
		IdentityKey::Username("msmith".to_string())
	}

	#[tokio::test]
	async fn test_attempts_are_throttled_at_quota() {
		let throttle = throttle_with_clock(frozen_clock());
		let quota = RateQuota::per_minutes(3, 15).unwrap();

		for _ in 0..3 {
			assert!(
				throttle
					.check_limit(&key(), quota)
					.await
					.unwrap()
					.is_allowed()
			);
			throttle.record(key(), AttemptOutcome::Failed).await.unwrap();
		}

		// Fourth attempt should be denied.
		assert!(
			!throttle
				.check_limit(&key(), quota)
				.await
				.unwrap()
				.is_allowed()
		);
	}

	#[tokio::test]
	async fn test_denial_expires_with_the_oldest_attempt() {
		let clock = frozen_clock();
		let throttle = throttle_with_clock(clock.clone());
		let quota = RateQuota::per_minutes(2, 15).unwrap();

		throttle.record(key(), AttemptOutcome::Failed).await.unwrap();
		clock.advance(Duration::minutes(10));
		throttle.record(key(), AttemptOutcome::Failed).await.unwrap();

		// Blocked now; the attempt from 10 minutes ago expires in 5.
		assert!(
			!throttle
				.check_limit(&key(), quota)
				.await
				.unwrap()
				.is_allowed()
		);

		clock.advance(Duration::minutes(6));
		assert!(
			throttle
				.check_limit(&key(), quota)
				.await
				.unwrap()
				.is_allowed()
		);
	}

	#[tokio::test]
	async fn test_successful_attempts_count_toward_the_quota() {
		let throttle = throttle_with_clock(frozen_clock());
		let quota = RateQuota::per_minutes(2, 15).unwrap();

		throttle
			.record(key(), AttemptOutcome::Succeeded)
			.await
			.unwrap();
		throttle
			.record(key(), AttemptOutcome::Succeeded)
			.await
			.unwrap();

		assert!(
			!throttle
				.check_limit(&key(), quota)
				.await
				.unwrap()
				.is_allowed()
		);
	}

	#[tokio::test]
	async fn test_check_login_denies_when_either_dimension_denies() {
		let clock = frozen_clock();
		let throttle = throttle_with_clock(clock.clone());
		let policy = LoginThrottlePolicy::new(
			RateQuota::per_minutes(10, 15).unwrap(),
			RateQuota::per_minutes(2, 15).unwrap(),
		);

		// Two failures against one account from two different addresses.
		throttle
			.record_login("203.0.113.9", "msmith", AttemptOutcome::Failed)
			.await
			.unwrap();
		throttle
			.record_login("198.51.100.7", "msmith", AttemptOutcome::Failed)
			.await
			.unwrap();

		// Account dimension is full even though no address is.
		let decision = throttle
			.check_login("192.0.2.33", "msmith", &policy)
			.await
			.unwrap();
		assert!(!decision.is_allowed());

		// A different account from the same address is unaffected.
		let decision = throttle
			.check_login("192.0.2.33", "jdoe", &policy)
			.await
			.unwrap();
		assert!(decision.is_allowed());
	}

	#[tokio::test]
	async fn test_check_login_reports_smaller_remaining_count() {
		let throttle = throttle_with_clock(frozen_clock());
		let policy = LoginThrottlePolicy::new(
			RateQuota::per_minutes(10, 15).unwrap(),
			RateQuota::per_minutes(5, 15).unwrap(),
		);

		throttle
			.record_login("203.0.113.9", "msmith", AttemptOutcome::Failed)
			.await
			.unwrap();

		let decision = throttle
			.check_login("203.0.113.9", "msmith", &policy)
			.await
			.unwrap();

		assert_eq!(
			decision,
			RateLimitDecision::Allowed {
				attempts_remaining: 4
			}
		);
	}

	#[tokio::test]
	async fn test_store_errors_propagate_unchanged() {
		struct FailingStore;

		#[async_trait::async_trait]
		impl AttemptStore for FailingStore {
			async fn recent_attempts(
				&self,
				_key: &IdentityKey,
				_since: chrono::DateTime<Utc>,
			) -> Result<Vec<LoginAttempt>, String> {
				Err("connection reset".to_string())
			}

			async fn create_attempt(&self, _attempt: LoginAttempt) -> Result<(), String> {
				Err("connection reset".to_string())
			}
		}

		let throttle =
			LoginRateThrottle::with_time_provider(Arc::new(FailingStore), frozen_clock());
		let quota = RateQuota::per_minutes(5, 15).unwrap();

		let error = throttle.check_limit(&key(), quota).await.unwrap_err();
		assert!(matches!(
			error,
			ThrottleError::Store(ref message) if message == "connection reset"
		));
	}

	#[test]
	fn test_combine_prefers_the_later_retry_moment() {
		let earlier = Utc.with_ymd_and_hms(2025, 1, 1, 12, 5, 0).unwrap();
		let later = Utc.with_ymd_and_hms(2025, 1, 1, 12, 9, 0).unwrap();

		let combined = combine(
			RateLimitDecision::Denied {
				retry_after: earlier,
			},
			RateLimitDecision::Denied { retry_after: later },
		);

		assert_eq!(combined, RateLimitDecision::Denied { retry_after: later });
	}
}
