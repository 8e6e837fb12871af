//! State payload for bridge light updates.

use serde::{Deserialize, Serialize};

use crate::color::{BridgeColor, HexColor};

/// A partial light state to send to the bridge.
///
/// Fields left unset are omitted from the PUT body, so the bridge only
/// touches the attributes the payload carries.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use hue_lights_rs::{HexColor, StatePayload};
///
/// let payload = StatePayload::color(&HexColor::from_str("#ff0000").unwrap());
/// assert!(payload.on.is_none());
/// assert_eq!(payload.sat, Some(255));
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StatePayload {
    pub on: Option<bool>,
    pub hue: Option<u16>,
    pub sat: Option<u8>,
    pub bri: Option<u8>,
}

impl StatePayload {
    /// A color-only payload; the on/off state is left untouched.
    pub fn color(color: &HexColor) -> Self {
        let bridge = BridgeColor::from_hex(color);
        StatePayload {
            on: None,
            hue: Some(bridge.hue),
            sat: Some(bridge.sat),
            bri: Some(bridge.bri),
        }
    }

    /// A full payload for an on/off change.
    ///
    /// The bridge wants a consistent state push when toggling, so hue,
    /// sat, and bri are recomputed from the current color even though
    /// only the power state changed. Turning a light back on therefore
    /// re-applies a color that was set while it was off.
    pub fn power(on: bool, color: &HexColor) -> Self {
        let mut payload = StatePayload::color(color);
        payload.on = Some(on);
        payload
    }
}
