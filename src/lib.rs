//! # Claimdesk
//!
//! Core library of the claimdesk record-management backend: the two pieces
//! of the system with genuine correctness hazards, extracted behind storage
//! ports so the surrounding CRUD application stays a thin shell.
//!
//! - **Reference numbers** — collision-free, human-readable claim
//!   identifiers (date prefix + sequence) allocated against a store with no
//!   atomic-increment primitive.
//! - **Login throttling** — sliding-window rate limiting of authentication
//!   attempts, per remote address and per username independently.
//!
//! ## Feature Flags
//!
//! - `sequence` (default) - Reference number allocation
//! - `throttling` (default) - Login attempt throttling
//! - `full` - Everything
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use claimdesk::sequence::{MemoryReferenceStore, ReferenceAllocator};
//! use claimdesk::throttling::{AttemptOutcome, LoginRateThrottle, ThrottleSettings};
//!
//! # tokio_test::block_on(async {
//! // Allocate a reference number for a new claim.
//! let store = Arc::new(MemoryReferenceStore::new());
//! let allocator = ReferenceAllocator::new(store.clone());
//! let number = allocator.allocate().await.unwrap();
//! store.insert(number.as_str());
//!
//! // Gate a login attempt and record its outcome.
//! let throttle = LoginRateThrottle::new();
//! let policy = ThrottleSettings::default().policy().unwrap();
//! let decision = throttle
//! 	.check_login("203.0.113.9", "msmith", &policy)
//! 	.await
//! 	.unwrap();
//! assert!(decision.is_allowed());
//! throttle
//! 	.record_login("203.0.113.9", "msmith", AttemptOutcome::Failed)
//! 	.await
//! 	.unwrap();
//! # });
//! ```

// Module structure (feature-gated re-exports of the member crates)
#[cfg(feature = "sequence")]
pub use claimdesk_sequence as sequence;
#[cfg(feature = "throttling")]
pub use claimdesk_throttling as throttling;

// Shared kernel
pub use claimdesk_core::time_provider::{MockTimeProvider, SystemTimeProvider, TimeProvider};

// Commonly used types at the crate root
#[cfg(feature = "sequence")]
pub use claimdesk_sequence::{
	AllocatorConfig, ReferenceAllocator, ReferenceNumber, ReferenceStore, SequenceError,
	SequenceResult, SequenceSettings,
};

#[cfg(feature = "throttling")]
pub use claimdesk_throttling::{
	AttemptOutcome, AttemptStore, IdentityKey, LoginAttempt, LoginRateThrottle,
	LoginThrottlePolicy, RateLimitDecision, RateQuota, ThrottleError, ThrottleResult,
	ThrottleSettings,
};
