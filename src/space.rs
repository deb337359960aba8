//! Shared data types for spaces, displays and screens.
//!
//! A [`Display`] owns an ordered list of [`Space`]s exactly as the host's
//! configuration reported them.  The order of displays inside a
//! `Vec<Display>` is significant: the topology reader emits them in
//! configuration order, which is also the order the host uses to address
//! spaces.  Presentation code sorts a *copy* by
//! [`visual_order_key`](Display::visual_order_key).

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque 64-bit space identifier assigned by the host.
///
/// Stable across reboots and reconfiguration.  The string form (used as the
/// label store key) is the plain decimal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SpaceId(pub u64);

impl SpaceId {
    /// Parse the decimal string form produced by [`Display`](fmt::Display).
    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse().ok().map(SpaceId)
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SpaceId {
    fn from(id: u64) -> Self {
        SpaceId(id)
    }
}

/// Accepts a JSON number or a decimal string.
impl<'de> Deserialize<'de> for SpaceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = SpaceId;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "non-negative integer or decimal string")
            }
            fn visit_u64<E>(self, n: u64) -> Result<SpaceId, E> {
                Ok(SpaceId(n))
            }
            fn visit_i64<E>(self, n: i64) -> Result<SpaceId, E>
            where
                E: DeError,
            {
                u64::try_from(n)
                    .map(SpaceId)
                    .map_err(|_| DeError::custom("space id must be non-negative"))
            }
            fn visit_str<E>(self, s: &str) -> Result<SpaceId, E>
            where
                E: DeError,
            {
                SpaceId::parse(s)
                    .ok_or_else(|| DeError::custom(format!("invalid space id: {:?}", s)))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// One virtual desktop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Space {
    pub id: SpaceId,
    /// 0-based position inside the owning display's space list.
    pub position: usize,
    /// Id of the owning [`Display`].
    pub display_id: String,
    /// Whether the live query reports this space as active.  Never persisted.
    pub is_current: bool,
}

impl Space {
    /// The user-facing number of this space (`position + 1`).
    pub fn number(&self) -> usize {
        self.position + 1
    }
}

/// A physical output with its own independent list of spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    /// Host-assigned identifier.  [`PRIMARY_DISPLAY_ID`] marks the primary.
    pub id: String,
    /// Human-readable name, from screen metadata or a generated fallback.
    pub name: String,
    /// Horizontal position of the resolved screen.  Presentation only;
    /// never consulted when addressing spaces.
    pub visual_order_key: f64,
    /// Spaces in configuration order.
    pub spaces: Vec<Space>,
}

impl Display {
    /// Whether this is the host's primary display.
    pub fn is_primary(&self) -> bool {
        self.id == PRIMARY_DISPLAY_ID
    }

    /// The space currently marked active on this display, if any.
    pub fn current_space(&self) -> Option<&Space> {
        self.spaces.iter().find(|s| s.is_current)
    }
}

/// Identifier the configuration uses for the primary display.
pub const PRIMARY_DISPLAY_ID: &str = "Main";

/// Physical screen metadata reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenInfo {
    /// Whether this is the OS primary screen (the one carrying the menu bar).
    pub is_primary: bool,
    /// X position on the global desktop.
    pub x: f64,
    /// Localized screen name (e.g. `"Built-in Retina Display"`).
    pub name: String,
}

/// Return a copy of `displays` sorted left-to-right for presentation.
///
/// The sort is stable, so displays sharing a key keep configuration order.
pub fn visually_sorted(displays: &[Display]) -> Vec<Display> {
    let mut sorted = displays.to_vec();
    sorted.sort_by(|a, b| a.visual_order_key.total_cmp(&b.visual_order_key));
    sorted
}
