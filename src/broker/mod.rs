//! Signal Broker Facade
//!
//! The single entry point the transport layer talks to. Connects the shared store, owns
//! the availability breaker and wires the peer directory, node registry, message queue and
//! local peer tracking around them.
//!
//! Every inbound operation is available directly on `SignalBroker`; the component handles
//! are exposed as well for callers that want to pass only one capability around.

pub mod service;

pub use service::{BrokerOptions, SignalBroker};
