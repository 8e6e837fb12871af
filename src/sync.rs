//! Outbound state synchronization from local lights to the bridge.

use log::warn;

use crate::bridge::BridgeClient;
use crate::light::{Light, PROP_COLOR, PROP_ON};
use crate::payload::StatePayload;

/// Turns local property changes into bridge state updates.
///
/// Deterministic per light: the payload is computed from the light's
/// current cached state only, so replaying the same change pushes the
/// same payload.
pub struct SyncEngine;

impl SyncEngine {
    /// Compute the payload for a changed property.
    ///
    /// A color change pushes hue/sat/bri and leaves the power state
    /// untouched; an on/off change pushes the full state (see
    /// [`StatePayload::power`]). Anything else is a forward-compatible
    /// no-op.
    pub fn payload_for(light: &Light, property: &str) -> Option<StatePayload> {
        match property {
            PROP_COLOR => Some(StatePayload::color(light.color())),
            PROP_ON => Some(StatePayload::power(light.on(), light.color())),
            other => {
                warn!("unrecognized property {other:?}, nothing to push");
                None
            }
        }
    }

    /// Push a payload to the bridge for one light.
    ///
    /// Failures are logged and swallowed: a failed push must never block
    /// the next local change, and the optimistic local value is not
    /// rolled back.
    pub async fn push(
        client: &BridgeClient,
        credential: &str,
        light_id: &str,
        payload: &StatePayload,
    ) {
        if let Err(e) = client.set_state(credential, light_id, payload).await {
            warn!("state push for light {light_id} failed: {e}");
        }
    }
}
