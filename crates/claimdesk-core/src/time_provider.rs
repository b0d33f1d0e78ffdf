use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// Trait for providing wall-clock time to claimdesk components.
/// This allows for time mocking in tests.
///
/// Components that derive calendar values (date prefixes, sliding windows)
/// need wall-clock time rather than a monotonic instant, so the port speaks
/// `DateTime<Utc>`.
pub trait TimeProvider: Send + Sync {
	fn now(&self) -> DateTime<Utc>;
}

/// Time provider that uses the actual system clock.
#[derive(Clone, Default)]
pub struct SystemTimeProvider;

impl SystemTimeProvider {
	pub fn new() -> Self {
		Self
	}
}

impl TimeProvider for SystemTimeProvider {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// Mock time provider for testing that allows manual time control.
#[derive(Clone)]
pub struct MockTimeProvider {
	current_time: Arc<RwLock<DateTime<Utc>>>,
}

impl MockTimeProvider {
	pub fn new(start_time: DateTime<Utc>) -> Self {
		Self {
			current_time: Arc::new(RwLock::new(start_time)),
		}
	}

	pub fn advance(&self, duration: Duration) {
		let mut time = self.current_time.write();
		*time += duration;
	}

	pub fn set_time(&self, time: DateTime<Utc>) {
		let mut current = self.current_time.write();
		*current = time;
	}
}

impl Default for MockTimeProvider {
	fn default() -> Self {
		Self::new(Utc::now())
	}
}

impl TimeProvider for MockTimeProvider {
	fn now(&self) -> DateTime<Utc> {
		*self.current_time.read()
	}
}
