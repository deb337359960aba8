//! Command transport for shells and scripts.
//!
//! Status bars, key-bind helpers and scripts connect to a Unix socket and
//! send newline-delimited JSON [`Command`](crate::command::Command)s.

pub mod listener;
