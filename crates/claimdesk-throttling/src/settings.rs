//! Settings for login throttling.

use crate::limiter::LoginThrottlePolicy;
use crate::window::RateQuota;
use crate::ThrottleResult;
use serde::{Deserialize, Serialize};

/// Deserializable settings for the two login-throttle dimensions.
///
/// # Examples
///
/// ```
/// use claimdesk_throttling::ThrottleSettings;
///
/// let settings: ThrottleSettings =
/// 	serde_json::from_str(r#"{"username_max_attempts": 3}"#).unwrap();
/// assert_eq!(settings.username_max_attempts, 3);
///
/// let policy = settings.policy().unwrap();
/// assert_eq!(policy.username.max_attempts(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleSettings {
	/// Maximum attempts per remote address within its window.
	pub ip_max_attempts: usize,
	/// Rolling window for the address dimension, in minutes.
	pub ip_window_minutes: i64,
	/// Maximum attempts per username within its window.
	pub username_max_attempts: usize,
	/// Rolling window for the username dimension, in minutes.
	pub username_window_minutes: i64,
}

impl Default for ThrottleSettings {
	fn default() -> Self {
		Self {
			ip_max_attempts: 10,
			ip_window_minutes: 15,
			username_max_attempts: 5,
			username_window_minutes: 15,
		}
	}
}

impl ThrottleSettings {
	/// Validate the settings into a runtime policy.
	///
	/// # Errors
	///
	/// Returns [`ThrottleError::InvalidConfig`] when a quota is zero or a
	/// window is not positive.
	///
	/// [`ThrottleError::InvalidConfig`]: crate::ThrottleError::InvalidConfig
	pub fn policy(&self) -> ThrottleResult<LoginThrottlePolicy> {
		Ok(LoginThrottlePolicy::new(
			RateQuota::per_minutes(self.ip_max_attempts, self.ip_window_minutes)?,
			RateQuota::per_minutes(self.username_max_attempts, self.username_window_minutes)?,
		))
	}
}
