//! Discovery and tracking of a bridge's lights.

use std::collections::HashMap;

use log::debug;

use crate::bridge::BridgeClient;
use crate::errors::Error;
use crate::light::Light;

type Result<T> = std::result::Result<T, Error>;

/// One synchronized [`Light`] per discovered bridge-local light id.
///
/// Two deliberate limitations are carried here: already-tracked lights are
/// never refreshed from a later discovery response, and lights that
/// disappear from the bridge are never pruned from the registry.
#[derive(Debug)]
pub struct LightRegistry {
    bridge_id: String,
    lights: HashMap<String, Light>,
}

impl LightRegistry {
    pub fn new(bridge_id: &str) -> Self {
        LightRegistry {
            bridge_id: bridge_id.to_string(),
            lights: HashMap::new(),
        }
    }

    /// Fetch the bridge's lights listing and track any new lights.
    ///
    /// Returns the bridge-local ids of the lights added by this cycle;
    /// a repeat call with an unchanged listing adds nothing. Fails with
    /// [`Error::NotPaired`] when no credential is available yet.
    pub async fn discover(
        &mut self,
        client: &BridgeClient,
        credential: Option<&str>,
    ) -> Result<Vec<String>> {
        let credential = credential.ok_or_else(|| Error::NotPaired(self.bridge_id.clone()))?;
        let listing = client.get_lights(credential).await?;

        let mut added = Vec::new();
        for (light_id, info) in &listing {
            if self.lights.contains_key(light_id) {
                continue;
            }
            let light = Light::from_info(&self.bridge_id, light_id, info);
            debug!("discovered light {light_id}: {:?}", info.name);
            self.lights.insert(light_id.clone(), light);
            added.push(light_id.clone());
        }
        added.sort();
        Ok(added)
    }

    /// Look up a light by bridge-local id.
    pub fn get(&self, light_id: &str) -> Option<&Light> {
        self.lights.get(light_id)
    }

    pub(crate) fn get_mut(&mut self, light_id: &str) -> Option<&mut Light> {
        self.lights.get_mut(light_id)
    }

    /// Bridge-local ids of all tracked lights.
    pub fn light_ids(&self) -> Vec<&str> {
        self.lights.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}
