//! [`SpaceHost`] implementation backed by a JSON snapshot file.
//!
//! The file is re-read on every query, so editing it (or having an external
//! exporter rewrite it) is picked up on the next tick.  Activation commands
//! are not delivered anywhere: they are logged and kept in an in-memory
//! journal, which makes this a dry-run host.
//!
//! # File format
//!
//! ```json
//! {
//!   "configuration": { "Management Data": { "Monitors": [ … ] } },
//!   "active_spaces": [ 3, "12" ],
//!   "screens": [ { "is_primary": true, "x": 0.0, "name": "Built-in" } ]
//! }
//! ```
//!
//! Every key is optional.

use crate::address::ActivationIndex;
use crate::space::{ScreenInfo, SpaceId};
use crate::traits::SpaceHost;
use log::info;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Snapshot-file host.
pub struct SnapshotHost {
    path: PathBuf,
    journal: RefCell<Vec<ActivationIndex>>,
}

/// Errors that can occur when reading the snapshot.
#[derive(Debug, thiserror::Error)]
#[error("snapshot error: {0}")]
pub struct SnapshotHostError(String);

/// On-disk layout of the snapshot file.
#[derive(Deserialize, Default)]
#[serde(default)]
struct SnapshotJson {
    configuration: serde_json::Value,
    active_spaces: Vec<SpaceId>,
    screens: Vec<ScreenInfo>,
}

impl SnapshotHost {
    /// Create a host reading from `path`.
    ///
    /// Nothing is read eagerly; a missing file only shows up as a query
    /// error.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            journal: RefCell::new(Vec::new()),
        }
    }

    /// The filesystem path of the snapshot.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every activation sent so far, oldest first.
    pub fn journal(&self) -> Vec<ActivationIndex> {
        self.journal.borrow().clone()
    }

    fn read(&self) -> Result<SnapshotJson, SnapshotHostError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            SnapshotHostError(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            SnapshotHostError(format!("failed to parse {}: {}", self.path.display(), e))
        })
    }
}

impl SpaceHost for SnapshotHost {
    type Error = SnapshotHostError;

    fn configuration_snapshot(&self) -> Result<serde_json::Value, Self::Error> {
        Ok(self.read()?.configuration)
    }

    fn active_spaces(&self) -> Result<HashSet<SpaceId>, Self::Error> {
        Ok(self.read()?.active_spaces.into_iter().collect())
    }

    fn screens(&self) -> Result<Vec<ScreenInfo>, Self::Error> {
        Ok(self.read()?.screens)
    }

    fn send_activation(&self, index: ActivationIndex) -> Result<(), Self::Error> {
        info!("activate space slot {} (dry run)", index);
        self.journal.borrow_mut().push(index);
        Ok(())
    }
}
