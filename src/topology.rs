//! Space topology from the host's configuration snapshot.
//!
//! The snapshot is the host's persisted display/space configuration, a
//! loosely typed nested map:
//!
//! ```json
//! {
//!   "Management Data": {
//!     "Monitors": [
//!       {
//!         "Display Identifier": "Main",
//!         "Spaces": [ { "ManagedSpaceID": 3 }, { "id64": 7 } ]
//!       },
//!       {
//!         "Display Identifier": "37D8832A-2D66-02CA-B9F7-8F30A301B230",
//!         "Collapsed Space": { "ManagedSpaceID": 12 },
//!         "Spaces": [ { "ManagedSpaceID": 12 } ]
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! Only the keys above are consulted and everything else is ignored.  The
//! format is not under our control, so every lookup is fallible and a bad
//! record is dropped rather than failing the whole read.
//!
//! # Screen resolution
//!
//! Monitor records carry no geometry.  The primary monitor is always
//! identified as `"Main"` and maps to the OS primary screen; the remaining
//! monitors are paired, in snapshot order, with the non-primary screens
//! sorted left-to-right.  This is a positional guess, not a content match:
//! the snapshot simply doesn't say which screen a UUID belongs to.

use crate::space::{Display, ScreenInfo, Space, SpaceId, PRIMARY_DISPLAY_ID};
use log::{debug, trace};
use serde_json::Value;

const MANAGEMENT_DATA: &str = "Management Data";
const MONITORS: &str = "Monitors";
const DISPLAY_IDENTIFIER: &str = "Display Identifier";
const COLLAPSED_SPACE: &str = "Collapsed Space";
const SPACES: &str = "Spaces";
const SPACE_ID_KEY: &str = "ManagedSpaceID";
const SPACE_ID_FALLBACK_KEY: &str = "id64";

/// Build the display list from a configuration snapshot and screen metadata.
///
/// The result is in snapshot order, which is the order the host uses to
/// address spaces.  Returns an empty list when the top-level keys are
/// missing or have the wrong shape.
pub fn read(config: &Value, screens: &[ScreenInfo]) -> Vec<Display> {
    let Some(monitors) = config
        .get(MANAGEMENT_DATA)
        .and_then(|m| m.get(MONITORS))
        .and_then(Value::as_array)
    else {
        debug!("configuration snapshot has no monitor list");
        return Vec::new();
    };

    let mut screens = ScreenPairing::new(screens);
    let mut displays = Vec::new();

    for monitor in monitors {
        let Some(display_id) = monitor.get(DISPLAY_IDENTIFIER).and_then(Value::as_str) else {
            trace!("skipping monitor record without identifier");
            continue;
        };
        if monitor.get(COLLAPSED_SPACE).is_some() {
            debug!("skipping collapsed display {}", display_id);
            continue;
        }
        let spaces = read_spaces(monitor, display_id);
        if spaces.is_empty() {
            debug!("skipping display {} with no spaces", display_id);
            continue;
        }

        let fallback_name = format!("Display {}", displays.len() + 1);
        let (name, visual_order_key) = match screens.resolve(display_id) {
            Some(screen) => (screen.name.clone(), screen.x),
            None => (fallback_name, f64::MAX),
        };

        displays.push(Display {
            id: display_id.to_string(),
            name,
            visual_order_key,
            spaces,
        });
    }

    displays
}

/// Parse the space list of one monitor record.
///
/// Positions count only the records that produced an id, so they stay
/// contiguous when a malformed record is skipped.
fn read_spaces(monitor: &Value, display_id: &str) -> Vec<Space> {
    let Some(records) = monitor.get(SPACES).and_then(Value::as_array) else {
        return Vec::new();
    };
    records
        .iter()
        .filter_map(|record| {
            let id = space_id(record);
            if id.is_none() {
                trace!("skipping space record without id on {}", display_id);
            }
            id
        })
        .enumerate()
        .map(|(position, id)| Space {
            id,
            position,
            display_id: display_id.to_string(),
            is_current: false,
        })
        .collect()
}

/// Extract a space id, trying the primary key before the fallback key.
fn space_id(record: &Value) -> Option<SpaceId> {
    [SPACE_ID_KEY, SPACE_ID_FALLBACK_KEY]
        .iter()
        .find_map(|key| record.get(*key).and_then(value_as_space_id))
}

fn value_as_space_id(v: &Value) -> Option<SpaceId> {
    match v {
        Value::Number(n) => n.as_u64().map(SpaceId),
        Value::String(s) => SpaceId::parse(s),
        _ => None,
    }
}

/// Hands out screens to monitor records as they are encountered.
struct ScreenPairing<'a> {
    primary: Option<&'a ScreenInfo>,
    /// Non-primary screens, left to right.
    others: Vec<&'a ScreenInfo>,
    next_other: usize,
}

impl<'a> ScreenPairing<'a> {
    fn new(screens: &'a [ScreenInfo]) -> Self {
        let primary = screens.iter().find(|s| s.is_primary);
        let mut others: Vec<&ScreenInfo> = screens.iter().filter(|s| !s.is_primary).collect();
        others.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self {
            primary,
            others,
            next_other: 0,
        }
    }

    fn resolve(&mut self, display_id: &str) -> Option<&'a ScreenInfo> {
        if display_id == PRIMARY_DISPLAY_ID {
            return self.primary;
        }
        let screen = self.others.get(self.next_other).copied();
        self.next_other += 1;
        screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn screens() -> Vec<ScreenInfo> {
        vec![
            ScreenInfo {
                is_primary: false,
                x: 1728.0,
                name: "DELL U2720Q".into(),
            },
            ScreenInfo {
                is_primary: true,
                x: 0.0,
                name: "Built-in Retina Display".into(),
            },
            ScreenInfo {
                is_primary: false,
                x: -2560.0,
                name: "LG HDR 4K".into(),
            },
        ]
    }

    fn ids(d: &Display) -> Vec<u64> {
        d.spaces.iter().map(|s| s.id.0).collect()
    }

    #[test]
    fn missing_top_level_keys_yield_empty() {
        assert!(read(&json!({}), &screens()).is_empty());
        assert!(read(&Value::Null, &screens()).is_empty());
        assert!(read(&json!({ "Management Data": {} }), &screens()).is_empty());
        assert!(read(&json!({ "Management Data": { "Monitors": "nope" } }), &screens()).is_empty());
        assert!(read(&json!([1, 2, 3]), &screens()).is_empty());
    }

    #[test]
    fn reads_displays_in_snapshot_order() {
        let config = json!({
            "Management Data": { "Monitors": [
                { "Display Identifier": "Main", "Spaces": [
                    { "ManagedSpaceID": 1 }, { "ManagedSpaceID": 2 }, { "ManagedSpaceID": 3 }
                ]},
                { "Display Identifier": "UUID-B", "Spaces": [
                    { "ManagedSpaceID": 4 }, { "ManagedSpaceID": 5 }
                ]}
            ]}
        });
        let displays = read(&config, &screens());
        assert_eq!(displays.len(), 2);
        assert_eq!(displays[0].id, "Main");
        assert_eq!(ids(&displays[0]), vec![1, 2, 3]);
        assert_eq!(displays[1].id, "UUID-B");
        assert_eq!(ids(&displays[1]), vec![4, 5]);
        assert_eq!(displays[1].spaces[1].position, 1);
        assert_eq!(displays[1].spaces[1].display_id, "UUID-B");
        assert!(displays.iter().flat_map(|d| &d.spaces).all(|s| !s.is_current));
    }

    #[test]
    fn falls_back_to_secondary_id_key() {
        let config = json!({
            "Management Data": { "Monitors": [
                { "Display Identifier": "Main", "Spaces": [
                    { "id64": 10 }, { "ManagedSpaceID": 11, "id64": 99 }, { "ManagedSpaceID": "12" }
                ]}
            ]}
        });
        let displays = read(&config, &screens());
        assert_eq!(ids(&displays[0]), vec![10, 11, 12]);
    }

    #[test]
    fn malformed_space_records_are_skipped() {
        let config = json!({
            "Management Data": { "Monitors": [
                { "Display Identifier": "Main", "Spaces": [
                    { "ManagedSpaceID": 1 },
                    { "uuid": "no-id-here" },
                    "not even a map",
                    { "ManagedSpaceID": -4 },
                    { "id64": 2 }
                ]}
            ]}
        });
        let displays = read(&config, &screens());
        assert_eq!(ids(&displays[0]), vec![1, 2]);
        let positions: Vec<usize> = displays[0].spaces.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1]);
    }

    #[test]
    fn collapsed_display_is_excluded() {
        let config = json!({
            "Management Data": { "Monitors": [
                { "Display Identifier": "Main", "Spaces": [ { "ManagedSpaceID": 1 } ] },
                { "Display Identifier": "UUID-GONE",
                  "Collapsed Space": { "ManagedSpaceID": 9 },
                  "Spaces": [ { "ManagedSpaceID": 9 }, { "ManagedSpaceID": 10 } ] }
            ]}
        });
        let displays = read(&config, &screens());
        assert_eq!(displays.len(), 1);
        assert_eq!(displays[0].id, "Main");
    }

    #[test]
    fn empty_display_is_excluded() {
        let config = json!({
            "Management Data": { "Monitors": [
                { "Display Identifier": "Main", "Spaces": [ { "ManagedSpaceID": 1 } ] },
                { "Display Identifier": "UUID-EMPTY", "Spaces": [] },
                { "Display Identifier": "UUID-NOLIST" },
                { "Display Identifier": "UUID-B", "Spaces": [ { "ManagedSpaceID": 2 } ] }
            ]}
        });
        let displays = read(&config, &screens());
        let ids: Vec<&str> = displays.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["Main", "UUID-B"]);
    }

    #[test]
    fn monitor_without_identifier_is_skipped() {
        let config = json!({
            "Management Data": { "Monitors": [
                { "Spaces": [ { "ManagedSpaceID": 1 } ] },
                { "Display Identifier": "Main", "Spaces": [ { "ManagedSpaceID": 2 } ] }
            ]}
        });
        let displays = read(&config, &screens());
        assert_eq!(displays.len(), 1);
        assert_eq!(ids(&displays[0]), vec![2]);
    }

    #[test]
    fn screens_are_paired_positionally() {
        // Secondary monitors appear in snapshot order A, B; non-primary
        // screens sorted by x are LG (-2560) then DELL (1728).
        let config = json!({
            "Management Data": { "Monitors": [
                { "Display Identifier": "UUID-A", "Spaces": [ { "ManagedSpaceID": 1 } ] },
                { "Display Identifier": "Main", "Spaces": [ { "ManagedSpaceID": 2 } ] },
                { "Display Identifier": "UUID-B", "Spaces": [ { "ManagedSpaceID": 3 } ] }
            ]}
        });
        let displays = read(&config, &screens());
        assert_eq!(displays[0].name, "LG HDR 4K");
        assert_eq!(displays[0].visual_order_key, -2560.0);
        assert_eq!(displays[1].name, "Built-in Retina Display");
        assert_eq!(displays[1].visual_order_key, 0.0);
        assert_eq!(displays[2].name, "DELL U2720Q");
        assert_eq!(displays[2].visual_order_key, 1728.0);
    }

    #[test]
    fn collapsed_display_does_not_consume_a_screen() {
        let config = json!({
            "Management Data": { "Monitors": [
                { "Display Identifier": "UUID-GONE", "Collapsed Space": {},
                  "Spaces": [ { "ManagedSpaceID": 1 } ] },
                { "Display Identifier": "UUID-A", "Spaces": [ { "ManagedSpaceID": 2 } ] }
            ]}
        });
        let displays = read(&config, &screens());
        assert_eq!(displays.len(), 1);
        assert_eq!(displays[0].name, "LG HDR 4K");
    }

    #[test]
    fn unresolved_displays_get_generated_names() {
        let config = json!({
            "Management Data": { "Monitors": [
                { "Display Identifier": "Main", "Spaces": [ { "ManagedSpaceID": 1 } ] },
                { "Display Identifier": "UUID-A", "Spaces": [ { "ManagedSpaceID": 2 } ] }
            ]}
        });
        let displays = read(&config, &[]);
        assert_eq!(displays[0].name, "Display 1");
        assert_eq!(displays[1].name, "Display 2");
        assert_eq!(displays[0].visual_order_key, f64::MAX);
    }

    #[test]
    fn more_monitors_than_screens() {
        let only_primary = vec![ScreenInfo {
            is_primary: true,
            x: 0.0,
            name: "Built-in".into(),
        }];
        let config = json!({
            "Management Data": { "Monitors": [
                { "Display Identifier": "Main", "Spaces": [ { "ManagedSpaceID": 1 } ] },
                { "Display Identifier": "UUID-A", "Spaces": [ { "ManagedSpaceID": 2 } ] }
            ]}
        });
        let displays = read(&config, &only_primary);
        assert_eq!(displays[0].name, "Built-in");
        assert_eq!(displays[1].name, "Display 2");
    }
}
