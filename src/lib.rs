//! **spaceswitch** — multi-display space tracking and switching.
//!
//! The host window manager reports its virtual desktops ("spaces") through
//! two independent sources: a persisted configuration snapshot listing every
//! display and its spaces, and a live query of which spaces are active.
//! spaceswitch merges the two into one display-ordered model, assigns each
//! space a global activation index (the host accepts at most ten), and
//! keeps user-chosen labels per space.
//!
//! # Architecture
//!
//! Leaf to root:
//!
//! * [`names`] — typed label view over a [`traits::KeyValueStore`].
//! * [`topology`] — configuration snapshot + screens → displays.
//! * [`activity`] — live active set → `is_current` flags.
//! * [`address`] — (display, position) → activation index.
//! * [`model`] — the aggregate a shell refreshes, queries and switches with.
//!
//! The host itself is abstracted by [`traits::SpaceHost`] so none of the
//! above depends on a specific operating system.  [`host`] contains a
//! snapshot-file backend, [`store`] the label stores and [`ipc`] a
//! Unix-socket command listener used by the daemon.

pub mod activity;
pub mod address;
pub mod command;
pub mod config;
pub mod host;
pub mod ipc;
pub mod model;
pub mod names;
pub mod space;
pub mod store;
pub mod topology;
pub mod traits;
