//! Core traits that decouple spaceswitch from the host operating system,
//! the persistence backend and the command transport.
//!
//! Every concrete backend (the snapshot-file host, the JSON label store, a
//! Unix-socket listener, a test harness, …) implements one of these traits.
//! The [`SpaceModel`](crate::model::SpaceModel) only depends on these
//! abstractions.

use crate::address::ActivationIndex;
use crate::command::Command;
use crate::space::{ScreenInfo, SpaceId};
use std::collections::HashSet;
use std::sync::mpsc;

/// Abstraction over the host window manager.
///
/// Covers the three read-only queries the topology engine needs plus the
/// fire-and-forget activation channel.  None of the queries is expected to
/// block for longer than a fast local read.
pub trait SpaceHost {
    /// The error type produced by this host.
    type Error: std::error::Error + Send + 'static;

    /// Return the persisted space configuration blob.
    ///
    /// The blob is semi-structured; see [`topology`](crate::topology) for
    /// the keys that are consulted.  An absent configuration may be reported
    /// as `Value::Null` or as an error; both degrade to "no spaces".
    fn configuration_snapshot(&self) -> Result<serde_json::Value, Self::Error>;

    /// Return the set of currently active spaces, one per display.
    ///
    /// This is a real-time query and may disagree with the configuration
    /// blob, which the host only rewrites occasionally.
    fn active_spaces(&self) -> Result<HashSet<SpaceId>, Self::Error>;

    /// Return the physical screens the OS knows about.
    fn screens(&self) -> Result<Vec<ScreenInfo>, Self::Error>;

    /// Ask the host to activate the space at `index`.
    ///
    /// There is no confirmation; callers re-query the active set afterwards.
    fn send_activation(&self, index: ActivationIndex) -> Result<(), Self::Error>;
}

/// Namespaced persistent string storage.
///
/// Concurrent writers to the same namespace are not coordinated: the last
/// write wins.
pub trait KeyValueStore {
    /// The error type produced by this store.
    type Error: std::error::Error + Send + 'static;

    /// Read the value stored under `key`, if any.
    fn load(&self, namespace: &str, key: &str) -> Result<Option<String>, Self::Error>;

    /// Insert or overwrite `key`.
    fn store(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Remove `key`.  Removing a missing key is not an error.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), Self::Error>;

    /// Remove every key in `namespace` in one operation.
    fn clear(&mut self, namespace: &str) -> Result<(), Self::Error>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, an in-memory
/// channel) and forward parsed commands into the provided
/// [`mpsc::Sender`].  The model itself stays on the control thread; sources
/// never touch it.
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
