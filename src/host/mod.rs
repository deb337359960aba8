//! Concrete [`SpaceHost`](crate::traits::SpaceHost) backends.
//!
//! The real host queries are OS-specific and live outside this crate.  The
//! backend here serves a recorded snapshot from disk, which is what the
//! daemon binary and the integration tests run against.

pub mod snapshot;
