//! Pure sliding-window decision logic.
//!
//! [`evaluate`] is deliberately free of I/O and clocks: it maps a list of
//! in-window attempt timestamps plus a quota to a decision, so the policy
//! can be tested directly against synthetic histories. The throttle in
//! [`crate::limiter`] is a thin storage shell around it.

use crate::{ThrottleError, ThrottleResult};
use chrono::{DateTime, Duration, Utc};

/// Limit of attempts per rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateQuota {
	max_attempts: usize,
	window: Duration,
}

impl RateQuota {
	/// Creates a quota of `max_attempts` per rolling `window`.
	///
	/// # Errors
	///
	/// Returns [`ThrottleError::InvalidConfig`] if `max_attempts` is zero or
	/// `window` is not positive.
	///
	/// # Examples
	///
	/// ```
	/// use chrono::Duration;
	/// use claimdesk_throttling::RateQuota;
	///
	/// let quota = RateQuota::new(5, Duration::minutes(15)).unwrap();
	/// assert_eq!(quota.max_attempts(), 5);
	/// assert_eq!(quota.window(), Duration::minutes(15));
	/// ```
	pub fn new(max_attempts: usize, window: Duration) -> ThrottleResult<Self> {
		if max_attempts == 0 {
			return Err(ThrottleError::InvalidConfig(
				"max_attempts must be non-zero".to_string(),
			));
		}
		if window <= Duration::zero() {
			return Err(ThrottleError::InvalidConfig(
				"window must be a positive duration".to_string(),
			));
		}
		Ok(Self {
			max_attempts,
			window,
		})
	}

	/// Quota of `max_attempts` per `minutes`-minute window.
	///
	/// # Errors
	///
	/// Returns [`ThrottleError::InvalidConfig`] if `max_attempts` is zero or
	/// `minutes` is not positive.
	///
	/// # Examples
	///
	/// ```
	/// use claimdesk_throttling::RateQuota;
	///
	/// // 5 attempts per 15 minutes
	/// let quota = RateQuota::per_minutes(5, 15).unwrap();
	/// assert_eq!(quota.max_attempts(), 5);
	/// ```
	pub fn per_minutes(max_attempts: usize, minutes: i64) -> ThrottleResult<Self> {
		Self::new(max_attempts, Duration::minutes(minutes))
	}

	pub fn max_attempts(&self) -> usize {
		self.max_attempts
	}

	pub fn window(&self) -> Duration {
		self.window
	}
}

/// Outcome of a limit check.
///
/// The two variants carry mutually exclusive data: an allowance knows how
/// many attempts remain, a denial knows when retrying can first succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
	/// The identity may attempt now.
	Allowed {
		/// Attempts left before the quota is reached.
		attempts_remaining: usize,
	},
	/// The identity must wait.
	Denied {
		/// Earliest moment a new attempt can be allowed: when the oldest
		/// in-window attempt leaves the window.
		retry_after: DateTime<Utc>,
	},
}

impl RateLimitDecision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, RateLimitDecision::Allowed { .. })
	}
}

/// Decide whether another attempt is allowed given the attempts already
/// inside the window.
///
/// `timestamps` must contain only in-window attempts, newest first — the
/// order [`AttemptStore::recent_attempts`] guarantees. The window slides:
/// a denial does not wait out the whole window, only the expiry of the
/// single oldest blocking attempt, which is the tightest correct bound.
///
/// [`AttemptStore::recent_attempts`]: crate::store::AttemptStore::recent_attempts
pub fn evaluate(timestamps: &[DateTime<Utc>], quota: RateQuota) -> RateLimitDecision {
	if timestamps.len() < quota.max_attempts() {
		return RateLimitDecision::Allowed {
			attempts_remaining: quota.max_attempts() - timestamps.len(),
		};
	}
	match timestamps.last() {
		Some(oldest) => RateLimitDecision::Denied {
			retry_after: *oldest + quota.window(),
		},
		// Unreachable in practice: len >= max_attempts >= 1.
		None => RateLimitDecision::Allowed {
			attempts_remaining: quota.max_attempts(),
		},
	}
}
