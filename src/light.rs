//! The local light model and the host-facing device capability.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::bridge::LightInfo;
use crate::color::{BridgeColor, HexColor};

/// Property name for the on/off state.
pub const PROP_ON: &str = "on";
/// Property name for the color.
pub const PROP_COLOR: &str = "color";

/// The capability surface a host gateway consumes for any device:
/// a unique id, a display name, and typed properties with cached values.
///
/// Change notification is driven from the outside: the owner updates the
/// cached value through [`Device::set_value`] and then reacts to the
/// returned flag, so a single concrete implementation is enough.
pub trait Device {
    /// Globally unique device id.
    fn id(&self) -> &str;

    /// Human-readable display name.
    fn name(&self) -> &str;

    /// Names of the properties this device exposes.
    fn property_names(&self) -> Vec<&'static str>;

    /// Current cached value of a property, `None` when unknown.
    fn value(&self, property: &str) -> Option<Value>;

    /// Update the cached value of a property.
    ///
    /// Returns `true` when the property is recognized and the value was
    /// accepted; unrecognized properties are warned about and ignored.
    fn set_value(&mut self, property: &str, value: &Value) -> bool;
}

/// A single bridge light, mirrored locally.
///
/// The globally unique `id` is derived from the owning bridge's id plus
/// the bridge-local light id, computed once at creation. Bridge-issued
/// metadata such as the name is never updated in place afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Light {
    id: String,
    light_id: String,
    name: String,
    on: bool,
    color: HexColor,
}

impl Light {
    /// Build a light from a bridge discovery entry.
    ///
    /// The initial color is decoded from the reported hue/sat/bri triple.
    pub(crate) fn from_info(bridge_id: &str, light_id: &str, info: &LightInfo) -> Self {
        let state = &info.state;
        let color = BridgeColor::new(state.hue, state.sat, state.bri).to_hex();
        Light {
            id: format!("{bridge_id}-{light_id}"),
            light_id: light_id.to_string(),
            name: info.name.clone(),
            on: state.on,
            color,
        }
    }

    /// The bridge-local light id.
    pub fn light_id(&self) -> &str {
        &self.light_id
    }

    /// Whether the light is currently on, as cached locally.
    pub fn on(&self) -> bool {
        self.on
    }

    /// The locally cached color.
    pub fn color(&self) -> &HexColor {
        &self.color
    }
}

impl Device for Light {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn property_names(&self) -> Vec<&'static str> {
        vec![PROP_ON, PROP_COLOR]
    }

    fn value(&self, property: &str) -> Option<Value> {
        match property {
            PROP_ON => Some(json!(self.on)),
            PROP_COLOR => Some(json!(self.color.as_str())),
            _ => None,
        }
    }

    fn set_value(&mut self, property: &str, value: &Value) -> bool {
        match property {
            PROP_ON => match value.as_bool() {
                Some(on) => {
                    self.on = on;
                    true
                }
                None => {
                    warn!("light {}: non-boolean value for {PROP_ON}: {value}", self.id);
                    false
                }
            },
            PROP_COLOR => match value.as_str().and_then(|s| s.parse::<HexColor>().ok()) {
                Some(color) => {
                    self.color = color;
                    true
                }
                None => {
                    warn!("light {}: invalid color value: {value}", self.id);
                    false
                }
            },
            _ => {
                warn!("light {}: unrecognized property {property:?}", self.id);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::LightState;

    fn lamp() -> Light {
        let info = LightInfo {
            name: "Corner Lamp".to_string(),
            state: LightState {
                on: true,
                hue: 0,
                sat: 255,
                bri: 255,
            },
        };
        Light::from_info("bridge-1", "3", &info)
    }

    #[test]
    fn test_composite_id() {
        let light = lamp();
        assert_eq!(light.id(), "bridge-1-3");
        assert_eq!(light.light_id(), "3");
        assert_eq!(light.name(), "Corner Lamp");
    }

    #[test]
    fn test_initial_color_decoded_from_bridge_state() {
        let light = lamp();
        assert_eq!(light.color().as_str(), "#ff0000");
        assert!(light.on());
    }

    #[test]
    fn test_set_value_updates_cache() {
        let mut light = lamp();
        assert!(light.set_value(PROP_ON, &json!(false)));
        assert!(!light.on());

        assert!(light.set_value(PROP_COLOR, &json!("#00ff00")));
        assert_eq!(light.color().as_str(), "#00ff00");
    }

    #[test]
    fn test_set_value_rejects_unrecognized_and_malformed() {
        let mut light = lamp();
        assert!(!light.set_value("brightness", &json!(50)));
        assert!(!light.set_value(PROP_ON, &json!("yes")));
        assert!(!light.set_value(PROP_COLOR, &json!("chartreuse")));
        // Cache unchanged.
        assert!(light.on());
        assert_eq!(light.color().as_str(), "#ff0000");
    }
}
