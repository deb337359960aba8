//! Commands accepted by the daemon.
//!
//! [`Command`] describes every action a shell (status bar, key-bind helper,
//! script) can request.  Commands arrive over a
//! [`CommandSource`](crate::traits::CommandSource) and are applied by
//! [`SpaceModel::handle`](crate::model::SpaceModel::handle).
//!
//! Space ids are accepted either as JSON numbers or as decimal strings, since
//! 64-bit ids don't survive every JSON producer intact.

use crate::space::SpaceId;
use serde::{Deserialize, Serialize};

/// Every action the model can perform on request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Activate the space with this id, resolving its address against a
    /// fresh read of the topology.
    SwitchToSpace(SpaceId),

    /// Activate a pre-resolved global index (`1..=10`).
    SwitchToIndex(u32),

    /// Set the label of a space.  A blank name clears it.
    Rename { space: SpaceId, name: String },

    /// Remove the label of a space so it shows its number again.
    ClearLabel(SpaceId),

    /// Remove every stored label.
    ResetLabels,

    /// Re-read the topology immediately instead of waiting for the next tick.
    Refresh,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_switch_to_space_number_or_string() {
        let a: Command = serde_json::from_str(r#"{"SwitchToSpace":42}"#).unwrap();
        let b: Command = serde_json::from_str(r#"{"SwitchToSpace":"42"}"#).unwrap();
        assert_eq!(a, Command::SwitchToSpace(SpaceId(42)));
        assert_eq!(a, b);
    }

    #[test]
    fn parse_switch_to_index() {
        let c: Command = serde_json::from_str(r#"{"SwitchToIndex":3}"#).unwrap();
        assert_eq!(c, Command::SwitchToIndex(3));
    }

    #[test]
    fn parse_rename() {
        let c: Command =
            serde_json::from_str(r#"{"Rename":{"space":"18446744073709551615","name":"Mail"}}"#)
                .unwrap();
        assert_eq!(
            c,
            Command::Rename {
                space: SpaceId(u64::MAX),
                name: "Mail".into()
            }
        );
    }

    #[test]
    fn parse_unit_commands() {
        let r: Command = serde_json::from_str(r#""ResetLabels""#).unwrap();
        let f: Command = serde_json::from_str(r#""Refresh""#).unwrap();
        let c: Command = serde_json::from_str(r#"{"ClearLabel":7}"#).unwrap();
        assert_eq!(r, Command::ResetLabels);
        assert_eq!(f, Command::Refresh);
        assert_eq!(c, Command::ClearLabel(SpaceId(7)));
    }

    #[test]
    fn reject_unknown_command() {
        assert!(serde_json::from_str::<Command>(r#"{"Go":"Right"}"#).is_err());
        assert!(serde_json::from_str::<Command>(r#"{"SwitchToSpace":-3}"#).is_err());
    }
}
