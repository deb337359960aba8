//! Global activation addresses.
//!
//! The host accepts at most [`MAX_ACTIVATION_INDEX`] activation targets,
//! numbered `1..=10`.  Addresses are assigned by flattening the displays in
//! **configuration order** and each display's spaces in position order.
//! Displays sorted for presentation must never be passed in here: once the
//! user rearranges their monitors, visual order and configuration order
//! disagree and the wrong desktop would be activated.

use crate::space::{Display, SpaceId};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Number of activation slots the host's command channel exposes.
pub const MAX_ACTIVATION_INDEX: u8 = 10;

/// A validated 1-based activation index in `1..=MAX_ACTIVATION_INDEX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ActivationIndex(u8);

impl ActivationIndex {
    /// Returns `None` unless `1 <= n <= MAX_ACTIVATION_INDEX`.
    pub fn new(n: u32) -> Option<Self> {
        if (1..=MAX_ACTIVATION_INDEX as u32).contains(&n) {
            Some(ActivationIndex(n as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ActivationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address table keyed by `(display_id, position)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressMap {
    inner: HashMap<(String, usize), ActivationIndex>,
}

impl AddressMap {
    /// Look up the index assigned to the space at `position` on `display_id`.
    pub fn get(&self, display_id: &str, position: usize) -> Option<ActivationIndex> {
        self.inner.get(&(display_id.to_string(), position)).copied()
    }

    /// Iterate over `((display_id, position), index)` pairs in no
    /// particular order.
    pub fn iter(&self) -> impl Iterator<Item = ((&str, usize), ActivationIndex)> {
        self.inner
            .iter()
            .map(|((d, p), idx)| ((d.as_str(), *p), *idx))
    }

    /// Number of addressable spaces.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Walk spaces in addressing order, pairing each with its index until the
/// slots run out.
fn addressed(displays: &[Display]) -> impl Iterator<Item = (&Display, usize, SpaceId, ActivationIndex)> {
    displays
        .iter()
        .flat_map(|d| {
            let mut spaces: Vec<_> = d.spaces.iter().collect();
            spaces.sort_by_key(|s| s.position);
            spaces.into_iter().map(move |s| (d, s.position, s.id))
        })
        .zip(1..=MAX_ACTIVATION_INDEX as u32)
        .filter_map(|((d, pos, id), n)| ActivationIndex::new(n).map(|idx| (d, pos, id, idx)))
}

/// Assign activation indices to every addressable space in `displays`.
///
/// `displays` must be in configuration order.
pub fn resolve(displays: &[Display]) -> AddressMap {
    let inner = addressed(displays)
        .map(|(d, pos, _, idx)| ((d.id.clone(), pos), idx))
        .collect();
    AddressMap { inner }
}

/// Find the activation index of the space with id `space_id`.
///
/// Scans in the same order as [`resolve`] and stops at the first match.
/// Returns `None` if the id is unknown or falls beyond the last slot.
pub fn resolve_single(space_id: SpaceId, displays: &[Display]) -> Option<ActivationIndex> {
    addressed(displays)
        .find(|(_, _, id, _)| *id == space_id)
        .map(|(_, _, _, idx)| idx)
}

/// Number of addresses `displays` would occupy (`min(10, total spaces)`).
pub fn address_count(displays: &[Display]) -> usize {
    let total: usize = displays.iter().map(|d| d.spaces.len()).sum();
    total.min(MAX_ACTIVATION_INDEX as usize)
}
