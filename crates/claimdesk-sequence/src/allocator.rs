//! Scan-then-verify reference number allocation.
//!
//! The store offers no atomic increment, so the allocator emulates one in
//! three steps: scan today's numbers for the highest sequence in use, verify
//! the next candidate with an exact-match lookup, and on collision probe
//! forward one sequence at a time under a fixed retry budget. No locks are
//! taken anywhere; a stale scan only costs extra probes, never uniqueness,
//! because a candidate is returned only after its exact-match check comes
//! back empty.

use crate::reference::{MAX_SEQUENCE, ReferenceNumber, SEQUENCE_DIGITS};
use crate::store::{ReferenceQuery, ReferenceStore, SortOrder};
use crate::{SequenceError, SequenceResult};
use chrono_tz::Tz;
use claimdesk_core::time_provider::{SystemTimeProvider, TimeProvider};
use std::sync::Arc;

/// Upper bound on the same-day records scanned to estimate the current
/// maximum sequence. Past this many allocations per day the scan can miss
/// the true maximum; the exact-match probe below remains the sole backstop.
const SCAN_PAGE_SIZE: usize = 100;

/// Exact-match verification attempts before a call gives up.
const PROBE_BUDGET: u32 = 10;

/// Runtime configuration for [`ReferenceAllocator`].
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
	/// Calendar used to derive the 8-digit date prefix. Allocations on
	/// either side of this zone's midnight land in different namespaces.
	pub timezone: Tz,
}

impl Default for AllocatorConfig {
	fn default() -> Self {
		Self { timezone: Tz::UTC }
	}
}

/// Allocates collision-free reference numbers for "today".
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use claimdesk_sequence::{MemoryReferenceStore, ReferenceAllocator};
///
/// # tokio_test::block_on(async {
/// let store = Arc::new(MemoryReferenceStore::new());
/// let allocator = ReferenceAllocator::new(store.clone());
///
/// let number = allocator.allocate().await.unwrap();
/// assert_eq!(number.sequence(), 1);
///
/// // The caller persists the claim; here the store records it directly.
/// store.insert(number.as_str());
/// assert_eq!(allocator.allocate().await.unwrap().sequence(), 2);
/// # });
/// ```
pub struct ReferenceAllocator<S: ReferenceStore, T: TimeProvider = SystemTimeProvider> {
	store: Arc<S>,
	time_provider: Arc<T>,
	config: AllocatorConfig,
}

impl<S: ReferenceStore> ReferenceAllocator<S> {
	/// Creates an allocator on the system clock with the default
	/// configuration (UTC calendar).
	pub fn new(store: Arc<S>) -> Self {
		Self::with_time_provider(store, Arc::new(SystemTimeProvider::new()))
	}
}

impl<S: ReferenceStore, T: TimeProvider> ReferenceAllocator<S, T> {
	/// Creates an allocator with a custom time provider.
	pub fn with_time_provider(store: Arc<S>, time_provider: Arc<T>) -> Self {
		Self {
			store,
			time_provider,
			config: AllocatorConfig::default(),
		}
	}

	/// Replace the configuration.
	pub fn with_config(mut self, config: AllocatorConfig) -> Self {
		self.config = config;
		self
	}

	/// Produce a reference number guaranteed unused at the moment its
	/// exact-match verification succeeded.
	///
	/// The uncontended path costs one scan plus one exact-match lookup. When
	/// a concurrent caller claims the same candidate between scan and
	/// verification, the sequence is probed forward, at most ten
	/// verifications per call.
	///
	/// # Errors
	///
	/// - [`SequenceError::SequenceExhausted`] — today's 7-digit namespace is
	///   full. Not retryable.
	/// - [`SequenceError::AllocationExhausted`] — every probed candidate
	///   collided. Calling `allocate` again starts from a fresh scan and is
	///   always safe.
	/// - [`SequenceError::Store`] — backend failure, passed through.
	pub async fn allocate(&self) -> SequenceResult<ReferenceNumber> {
		let today = self
			.time_provider
			.now()
			.with_timezone(&self.config.timezone)
			.date_naive();
		let prefix = ReferenceNumber::prefix_for(today);

		let query = ReferenceQuery {
			prefix: prefix.clone(),
			page: 1,
			limit: SCAN_PAGE_SIZE,
			sort: SortOrder::Descending,
		};
		let existing = self
			.store
			.find_references(&query)
			.await
			.map_err(SequenceError::Store)?;

		let highest = existing
			.iter()
			.filter_map(|raw| trailing_sequence(raw, &prefix))
			.max();
		let mut sequence = highest.map_or(1, |sequence| sequence + 1);

		let mut attempts = 0;
		while attempts < PROBE_BUDGET {
			if sequence > MAX_SEQUENCE {
				tracing::warn!(date_prefix = %prefix, "daily reference sequence capacity reached");
				return Err(SequenceError::SequenceExhausted {
					date_prefix: prefix,
				});
			}
			let candidate = ReferenceNumber::from_parts(today, sequence)?;
			let taken = self
				.store
				.find_by_number(candidate.as_str())
				.await
				.map_err(SequenceError::Store)?;
			attempts += 1;
			match taken {
				None => return Ok(candidate),
				Some(_) => {
					tracing::debug!(
						reference = %candidate,
						attempts,
						"candidate reference already taken, probing next sequence"
					);
					sequence += 1;
				}
			}
		}

		tracing::warn!(
			date_prefix = %prefix,
			attempts = PROBE_BUDGET,
			"reference allocation gave up after consecutive collisions"
		);
		Err(SequenceError::AllocationExhausted {
			attempts: PROBE_BUDGET,
		})
	}
}

/// Sequence encoded in `raw`, provided it carries the expected day prefix
/// and a well-formed sequence part. Anything else is ignored by the scan.
fn trailing_sequence(raw: &str, prefix: &str) -> Option<u32> {
	let rest = raw.strip_prefix(prefix)?;
	if rest.len() != SEQUENCE_DIGITS || !rest.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	rest.parse().ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::MemoryReferenceStore;
	use async_trait::async_trait;
	use chrono::TimeZone;
	use chrono::Utc;
	use claimdesk_core::time_provider::MockTimeProvider;

	fn frozen_clock() -> Arc<MockTimeProvider> {
		// 2025-01-01 12:00 UTC
		Arc::new(MockTimeProvider::new(
			Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
		))
	}

	fn allocator(
		store: Arc<MemoryReferenceStore>,
	) -> ReferenceAllocator<MemoryReferenceStore, MockTimeProvider> {
		ReferenceAllocator::with_time_provider(store, frozen_clock())
	}

	#[tokio::test]
	async fn test_first_allocation_of_the_day_is_sequence_one() {
		let store = Arc::new(MemoryReferenceStore::new());

		let number = allocator(store).allocate().await.unwrap();

		assert_eq!(number.as_str(), "202501010000001");
	}

	#[tokio::test]
	async fn test_allocation_continues_from_highest_existing_sequence() {
		let store = Arc::new(MemoryReferenceStore::new());
		for sequence in 1..=5 {
			store.insert(format!("20250101{:07}", sequence));
		}

		let number = allocator(store).allocate().await.unwrap();

		assert_eq!(number.as_str(), "202501010000006");
	}

	#[tokio::test]
	async fn test_allocation_ignores_other_days_and_malformed_numbers() {
		let store = Arc::new(MemoryReferenceStore::new());
		store.insert("202412310009999");
		store.insert("20250101garbage");
		store.insert("202501010000002");

		let number = allocator(store).allocate().await.unwrap();

		assert_eq!(number.as_str(), "202501010000003");
	}

	#[tokio::test]
	async fn test_capacity_exhaustion_fails_without_probing() {
		let store = Arc::new(MemoryReferenceStore::new());
		store.insert(format!("20250101{:07}", MAX_SEQUENCE));

		let error = allocator(store).allocate().await.unwrap_err();

		assert!(matches!(
			error,
			SequenceError::SequenceExhausted { ref date_prefix } if date_prefix == "20250101"
		));
	}

	#[tokio::test]
	async fn test_date_prefix_follows_configured_timezone() {
		// 2025-01-01 23:30 UTC is already 2025-01-02 in Tokyo.
		let store = Arc::new(MemoryReferenceStore::new());
		let clock = Arc::new(MockTimeProvider::new(
			Utc.with_ymd_and_hms(2025, 1, 1, 23, 30, 0).unwrap(),
		));
		let allocator = ReferenceAllocator::with_time_provider(store, clock).with_config(
			AllocatorConfig {
				timezone: chrono_tz::Asia::Tokyo,
			},
		);

		let number = allocator.allocate().await.unwrap();

		assert_eq!(number.date_prefix(), "20250102");
	}

	/// Store whose scan is stale: it reports only what was present at
	/// construction, while exact-match lookups see every number inserted
	/// since. This is the race the probe loop exists for.
	struct StaleScanStore {
		scan_snapshot: Vec<String>,
		live: MemoryReferenceStore,
	}

	#[async_trait]
	impl ReferenceStore for StaleScanStore {
		async fn find_references(&self, query: &ReferenceQuery) -> Result<Vec<String>, String> {
			Ok(self
				.scan_snapshot
				.iter()
				.filter(|number| number.starts_with(&query.prefix))
				.cloned()
				.collect())
		}

		async fn find_by_number(&self, number: &str) -> Result<Option<String>, String> {
			self.live.find_by_number(number).await
		}
	}

	#[tokio::test]
	async fn test_collision_probes_to_next_free_sequence() {
		let live = MemoryReferenceStore::new();
		live.insert("202501010000001");
		live.insert("202501010000002");
		let store = Arc::new(StaleScanStore {
			scan_snapshot: vec!["202501010000001".to_string()],
			live,
		});

		// Scan suggests sequence 2, which a concurrent caller already took.
		let number = ReferenceAllocator::with_time_provider(store, frozen_clock())
			.allocate()
			.await
			.unwrap();

		assert_eq!(number.as_str(), "202501010000003");
	}

	#[tokio::test]
	async fn test_probe_budget_exhaustion_fails_the_call() {
		let live = MemoryReferenceStore::new();
		for sequence in 1..=50 {
			live.insert(format!("20250101{:07}", sequence));
		}
		let store = Arc::new(StaleScanStore {
			scan_snapshot: vec![],
			live,
		});

		let error = ReferenceAllocator::with_time_provider(store, frozen_clock())
			.allocate()
			.await
			.unwrap_err();

		assert!(matches!(
			error,
			SequenceError::AllocationExhausted { attempts: 10 }
		));
	}

	#[tokio::test]
	async fn test_store_errors_propagate_unchanged() {
		struct FailingStore;

		#[async_trait]
		impl ReferenceStore for FailingStore {
			async fn find_references(
				&self,
				_query: &ReferenceQuery,
			) -> Result<Vec<String>, String> {
				Err("connection reset".to_string())
			}

			async fn find_by_number(&self, _number: &str) -> Result<Option<String>, String> {
				Err("connection reset".to_string())
			}
		}

		let error = ReferenceAllocator::with_time_provider(Arc::new(FailingStore), frozen_clock())
			.allocate()
			.await
			.unwrap_err();

		assert!(matches!(
			error,
			SequenceError::Store(ref message) if message == "connection reset"
		));
	}
}
