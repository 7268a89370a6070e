//! Availability Breaker Module
//!
//! Tracks whether the shared store is currently considered reachable.
//!
//! ## State Machine
//! - **Available**: store operations proceed normally.
//! - **Unavailable**: entered on the first caught store failure. Gated writes are skipped,
//!   reads are still attempted and report sentinels on failure.
//!
//! Recovery is optimistic: a one-shot timer flips the breaker back to available after
//! `BREAK_DURATION`, without probing the store. Failures reported while already
//! unavailable neither re-arm nor extend that timer.
//!
//! The breaker is shared explicitly (`Arc<AvailabilityBreaker>`) by every component that
//! talks to the store.

pub mod service;

pub use service::{AvailabilityBreaker, BREAK_DURATION};
