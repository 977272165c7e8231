//! Thread-scoped log routing.
//!
//! Concurrent jobs each install a route from their worker thread to their
//! own log file; [`LogRouter::emit`] delivers a record only to the route of
//! the thread that produced it. [`RouterLayer`] plugs the router into a
//! `tracing` subscriber.

mod layer;
mod router;

pub use layer::RouterLayer;
pub use router::{LogRouter, RouteGuard};
