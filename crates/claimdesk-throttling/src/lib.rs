//! Sliding-window throttling of login attempts.
//!
//! Answers "may this identity attempt to authenticate right now?" by
//! counting the attempts recorded for it within a rolling window measured
//! back from the current moment. Two dimensions are throttled independently
//! with their own quotas: the remote address and the targeted username; a
//! login is denied when either dimension denies.
//!
//! There is no persisted "blocked" flag. Every check recomputes the state
//! from the attempt history, so the limiter survives restarts unchanged and
//! unblocks itself as attempts age out of the window. Two checks racing the
//! same snapshot can both pass one attempt over the nominal threshold; the
//! throttle is a best-effort brake, not a hard quota.
//!
//! Attempts are read and written through the [`AttemptStore`] port;
//! [`MemoryAttemptStore`] is provided for tests and single-process use, and
//! the denial decision itself is the pure function [`window::evaluate`].

pub mod attempt;
pub mod limiter;
pub mod settings;
pub mod store;
pub mod window;

pub use attempt::{AttemptOutcome, IdentityKey, LoginAttempt};
pub use limiter::{LoginRateThrottle, LoginThrottlePolicy};
pub use settings::ThrottleSettings;
pub use store::{AttemptStore, MemoryAttemptStore};
pub use window::{RateLimitDecision, RateQuota};

use thiserror::Error;

/// Errors surfaced by the login throttle.
///
/// Denial is a normal decision, never an error; the only runtime failure the
/// throttle can hit is its store, and those messages pass through unchanged.
#[derive(Debug, Error)]
pub enum ThrottleError {
	/// Rejected quota configuration.
	#[error("Invalid throttle configuration: {0}")]
	InvalidConfig(String),

	/// Error propagated unchanged from the backing attempt store.
	#[error("Storage error: {0}")]
	Store(String),
}

/// Result type for throttling operations.
pub type ThrottleResult<T> = Result<T, ThrottleError>;
