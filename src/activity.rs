//! Overlay of the live active-space set onto a topology.
//!
//! The configuration snapshot lags behind reality, so which space is current
//! comes from a separate real-time query.  A missing or failed query is
//! represented by an empty set and simply leaves every space non-current.

use crate::space::{Display, SpaceId};
use std::collections::HashSet;

/// Set `is_current` on every space: true iff its id is in `live`.
pub fn overlay(displays: &mut [Display], live: &HashSet<SpaceId>) {
    for space in displays.iter_mut().flat_map(|d| d.spaces.iter_mut()) {
        space.is_current = live.contains(&space.id);
    }
}
