//! Admin HTTP API
//!
//! A small axum surface for operators: health, peer lookups and attachment, published
//! client counts, and queue inspection and maintenance. The signaling transport itself
//! is not served here.
//!
//! ## Submodules
//! - **`protocol`**: endpoint paths and JSON DTOs.
//! - **`handlers`**: axum handlers over a shared `SignalBroker`, plus the router.

pub mod handlers;
pub mod protocol;
