//! Reference number allocation for claim records.
//!
//! Every claim carries a human-readable reference number: an 8-digit
//! `YYYYMMDD` date prefix followed by a 7-digit zero-padded sequence. The
//! backing store has no atomic-increment primitive, so [`ReferenceAllocator`]
//! emulates one: scan the store for today's highest sequence, verify the
//! candidate with an exact-match lookup, and probe forward over a bounded
//! number of collisions. The scan is a hint; the exact-match verification is
//! the source of truth.
//!
//! Storage is reached through the [`ReferenceStore`] port so the probing
//! policy can be exercised against a programmable backend. A
//! [`MemoryReferenceStore`] is provided for tests and single-process use.

pub mod allocator;
pub mod reference;
pub mod settings;
pub mod store;

pub use allocator::{AllocatorConfig, ReferenceAllocator};
pub use reference::{MAX_SEQUENCE, ReferenceNumber};
pub use settings::SequenceSettings;
pub use store::{MemoryReferenceStore, ReferenceQuery, ReferenceStore, SortOrder};

use thiserror::Error;

/// Errors surfaced by reference number allocation.
///
/// `SequenceExhausted` is an operational limit and never worth retrying.
/// `AllocationExhausted` is fatal to the current call only; invoking
/// [`ReferenceAllocator::allocate`] again re-reads the current maximum and
/// recovers once contention subsides. Store errors pass through unchanged.
#[derive(Debug, Error)]
pub enum SequenceError {
	/// The 7-digit sequence space for one calendar day is used up.
	#[error("reference sequence capacity exhausted for date prefix {date_prefix}")]
	SequenceExhausted {
		/// The day whose namespace is full.
		date_prefix: String,
	},

	/// Every probed candidate collided within the retry budget.
	#[error("no unique reference number found after {attempts} attempts")]
	AllocationExhausted {
		/// Number of exact-match verifications performed before giving up.
		attempts: u32,
	},

	/// A reference number string that does not have the required shape.
	#[error("invalid reference number: {0}")]
	InvalidReference(String),

	/// Error propagated unchanged from the backing store.
	#[error("Storage error: {0}")]
	Store(String),
}

/// Result type for allocation operations.
pub type SequenceResult<T> = Result<T, SequenceError>;
