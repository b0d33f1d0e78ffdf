//! Shared kernel for the claimdesk workspace.
//!
//! Holds the pieces every claimdesk crate needs and none should own alone.
//! Currently that is the wall-clock port: both reference allocation and
//! login throttling derive decisions from calendar time, and both need the
//! clock replaced in tests.

pub mod time_provider;

pub use time_provider::{MockTimeProvider, SystemTimeProvider, TimeProvider};
