//! Storage port for reference number lookups.
//!
//! Allocation never writes; persisting the claim that owns a freshly
//! allocated number is the caller's concern. The port therefore exposes only
//! the two reads the allocator needs, and backends report failures as plain
//! strings which the allocator wraps into [`SequenceError::Store`]
//! uninterpreted.
//!
//! [`SequenceError::Store`]: crate::SequenceError::Store

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Sort direction over the reference number itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
	Ascending,
	Descending,
}

/// Filtered search over persisted reference numbers.
#[derive(Debug, Clone)]
pub struct ReferenceQuery {
	/// Only numbers starting with this prefix are returned.
	pub prefix: String,
	/// 1-based page index.
	pub page: usize,
	/// Maximum number of results per page.
	pub limit: usize,
	/// Sort direction.
	pub sort: SortOrder,
}

/// Read access to the reference numbers already in use.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
	/// Search persisted reference numbers matching `query`.
	///
	/// Results need not be transactionally exact with respect to concurrent
	/// writers; the allocator treats them as a hint.
	async fn find_references(&self, query: &ReferenceQuery) -> Result<Vec<String>, String>;

	/// Exact-match lookup. Returns `None` when the number is unused.
	async fn find_by_number(&self, number: &str) -> Result<Option<String>, String>;
}

/// In-memory [`ReferenceStore`] backed by an ordered set.
///
/// Serves single-process use and doubles as the programmable store the
/// allocation tests race against. `insert` is inherent rather than part of
/// the port because allocation itself never writes.
///
/// # Examples
///
/// ```
/// use claimdesk_sequence::{MemoryReferenceStore, ReferenceQuery, ReferenceStore, SortOrder};
///
/// # tokio_test::block_on(async {
/// let store = MemoryReferenceStore::new();
/// store.insert("202501010000001");
/// store.insert("202501010000002");
///
/// let query = ReferenceQuery {
/// 	prefix: "20250101".to_string(),
/// 	page: 1,
/// 	limit: 100,
/// 	sort: SortOrder::Descending,
/// };
/// let found = store.find_references(&query).await.unwrap();
/// assert_eq!(found, vec!["202501010000002", "202501010000001"]);
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MemoryReferenceStore {
	numbers: Arc<RwLock<BTreeSet<String>>>,
}

impl MemoryReferenceStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record a number as taken. Returns `false` if it was already present,
	/// which is how callers detect that a concurrent writer won the slot.
	pub fn insert(&self, number: impl Into<String>) -> bool {
		self.numbers.write().insert(number.into())
	}

	/// Number of recorded references.
	pub fn len(&self) -> usize {
		self.numbers.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.numbers.read().is_empty()
	}
}

#[async_trait]
impl ReferenceStore for MemoryReferenceStore {
	async fn find_references(&self, query: &ReferenceQuery) -> Result<Vec<String>, String> {
		let numbers = self.numbers.read();
		let mut matching: Vec<String> = numbers
			.range(query.prefix.clone()..)
			.take_while(|number| number.starts_with(&query.prefix))
			.cloned()
			.collect();
		if query.sort == SortOrder::Descending {
			matching.reverse();
		}
		let offset = query.page.saturating_sub(1).saturating_mul(query.limit);
		Ok(matching.into_iter().skip(offset).take(query.limit).collect())
	}

	async fn find_by_number(&self, number: &str) -> Result<Option<String>, String> {
		Ok(self.numbers.read().get(number).cloned())
	}
}
