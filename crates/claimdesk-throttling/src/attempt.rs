//! Login attempt records and identity keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The dimension a login attempt is counted against.
///
/// Addresses and usernames are throttled independently: one address probing
/// many accounts and many addresses probing one account are both caught.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum IdentityKey {
	/// Remote address the attempt originated from.
	Ip(String),
	/// Account name the attempt targeted.
	Username(String),
}

impl IdentityKey {
	/// Storage key for this identity, namespaced per dimension so an
	/// address can never alias a username.
	pub fn storage_key(&self) -> String {
		match self {
			IdentityKey::Ip(address) => format!("throttle:ip:{}", address),
			IdentityKey::Username(name) => format!("throttle:username:{}", name),
		}
	}
}

impl fmt::Display for IdentityKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			IdentityKey::Ip(address) => write!(f, "ip:{}", address),
			IdentityKey::Username(name) => write!(f, "username:{}", name),
		}
	}
}

/// Outcome of a login attempt.
///
/// Kept for the audit trail; the limiter counts attempts regardless of how
/// they ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
	Succeeded,
	Failed,
}

/// One recorded authentication attempt.
///
/// Append-only and immutable once recorded; retention and purging are the
/// surrounding application's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
	/// Identity the attempt is counted against.
	pub key: IdentityKey,
	/// How the attempt ended.
	pub outcome: AttemptOutcome,
	/// When the attempt happened.
	pub attempted_at: DateTime<Utc>,
}

impl LoginAttempt {
	pub fn new(key: IdentityKey, outcome: AttemptOutcome, attempted_at: DateTime<Utc>) -> Self {
		Self {
			key,
			outcome,
			attempted_at,
		}
	}
}
