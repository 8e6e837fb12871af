//! Per-bridge composition root.

use std::sync::Mutex;
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;

use crate::bridge::BridgeClient;
use crate::errors::Error;
use crate::light::{Device, Light};
use crate::pairing::{PairingOutcome, PairingSession, PairingState};
use crate::payload::StatePayload;
use crate::registry::LightRegistry;
use crate::store::{CredentialStore, Storage};
use crate::sync::SyncEngine;

type Result<T> = std::result::Result<T, Error>;

/// Owns one bridge connection: its id and address, the acquired
/// credential, the pairing session, and the light registry.
///
/// The host gateway instantiates one adapter per discovered bridge and
/// keeps it for the process lifetime. All methods take `&self`, so the
/// adapter can sit behind an `Arc` and have pairing cancelled from a
/// different task than the one driving it.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use hue_lights_rs::{BridgeAdapter, MemoryStore};
///
/// async fn pair() -> Result<(), hue_lights_rs::Error> {
///     let adapter = BridgeAdapter::new("001788fffe123456", "192.168.1.2", MemoryStore::new())?;
///     adapter.boot().await?;
///     if !adapter.is_paired() {
///         adapter.start_pairing(Duration::from_secs(30)).await?;
///     }
///     Ok(())
/// }
/// ```
pub struct BridgeAdapter<S: Storage> {
    bridge_id: String,
    client: BridgeClient,
    store: CredentialStore<S>,
    credential: Mutex<Option<String>>,
    session: PairingSession,
    registry: AsyncMutex<LightRegistry>,
}

impl<S: Storage> BridgeAdapter<S> {
    /// Create an adapter for the bridge at `address`, persisting
    /// credentials through `storage`.
    pub fn new(bridge_id: &str, address: &str, storage: S) -> Result<Self> {
        Ok(BridgeAdapter {
            bridge_id: bridge_id.to_string(),
            client: BridgeClient::new(address)?,
            store: CredentialStore::new(storage),
            credential: Mutex::new(None),
            session: PairingSession::new(),
            registry: AsyncMutex::new(LightRegistry::new(bridge_id)),
        })
    }

    pub fn bridge_id(&self) -> &str {
        &self.bridge_id
    }

    /// Whether a credential is currently held.
    pub fn is_paired(&self) -> bool {
        self.credential.lock().unwrap().is_some()
    }

    /// The state of the pairing session.
    pub fn pairing_state(&self) -> PairingState {
        self.session.state()
    }

    /// Load any stored credential and, when found, run light discovery.
    ///
    /// Returns the bridge-local ids of the discovered lights; empty when
    /// the bridge is not paired yet and the adapter stays idle until
    /// [`BridgeAdapter::start_pairing`] is called.
    pub async fn boot(&self) -> Result<Vec<String>> {
        let Some(credential) = self.store.get(&self.bridge_id).await else {
            debug!("bridge {}: no stored credential, idle until pairing", self.bridge_id);
            return Ok(Vec::new());
        };
        debug!("bridge {}: reusing stored credential", self.bridge_id);
        *self.credential.lock().unwrap() = Some(credential);
        self.discover().await
    }

    /// Pair with the bridge, retrying until the link button is pressed or
    /// `timeout` elapses.
    ///
    /// When a credential is already held or stored, no registration
    /// request is issued; the call short-circuits to success and goes
    /// straight to discovery. On a fresh success the credential is cached
    /// immediately and merged into the store before discovery runs; a
    /// store write failure is logged and does not undo the pairing.
    pub async fn start_pairing(&self, timeout: Duration) -> Result<PairingOutcome> {
        if let Some(credential) = self.credential() {
            debug!("bridge {}: already paired", self.bridge_id);
            self.session.short_circuit();
            self.discover_logged().await;
            return Ok(PairingOutcome::Succeeded(credential));
        }
        if let Some(credential) = self.store.get(&self.bridge_id).await {
            debug!("bridge {}: credential found in store", self.bridge_id);
            *self.credential.lock().unwrap() = Some(credential.clone());
            self.session.short_circuit();
            self.discover_logged().await;
            return Ok(PairingOutcome::Succeeded(credential));
        }

        match self.session.run(&self.client, timeout).await {
            PairingOutcome::Succeeded(credential) => {
                // The bridge has already granted the credential; persisting
                // it is best effort and never undoes the pairing.
                *self.credential.lock().unwrap() = Some(credential.clone());
                if let Err(e) = self.store.put(&self.bridge_id, &credential).await {
                    warn!("bridge {}: credential not persisted: {e}", self.bridge_id);
                }
                self.discover_logged().await;
                Ok(PairingOutcome::Succeeded(credential))
            }
            outcome => Ok(outcome),
        }
    }

    /// Cancel an active pairing session.
    pub fn cancel_pairing(&self) {
        self.session.cancel();
    }

    /// Run one discovery cycle (see [`LightRegistry::discover`]).
    pub async fn discover(&self) -> Result<Vec<String>> {
        let credential = self.credential();
        let mut registry = self.registry.lock().await;
        registry.discover(&self.client, credential.as_deref()).await
    }

    /// Update a light property locally, then push the resulting state.
    ///
    /// The cached value is updated first (optimistically) and is never
    /// rolled back: a failed push is logged and swallowed so the next
    /// local change stays unblocked. Unrecognized properties and
    /// malformed values are warned about and make no bridge call.
    pub async fn set_property(&self, light_id: &str, property: &str, value: &Value) -> Result<()> {
        let credential = self
            .credential()
            .ok_or_else(|| Error::NotPaired(self.bridge_id.clone()))?;

        let payload = {
            let mut registry = self.registry.lock().await;
            let light = registry
                .get_mut(light_id)
                .ok_or_else(|| Error::LightNotFound(light_id.to_string()))?;
            if !light.set_value(property, value) {
                return Ok(());
            }
            SyncEngine::payload_for(light, property)
        };

        if let Some(payload) = payload {
            SyncEngine::push(&self.client, &credential, light_id, &payload).await;
        }
        Ok(())
    }

    /// Push an already-built payload for one light.
    ///
    /// Push failures are swallowed; only a missing credential is
    /// reported, since nothing can be sent without one.
    pub async fn send_properties(&self, light_id: &str, payload: &StatePayload) -> Result<()> {
        let credential = self
            .credential()
            .ok_or_else(|| Error::NotPaired(self.bridge_id.clone()))?;
        SyncEngine::push(&self.client, &credential, light_id, payload).await;
        Ok(())
    }

    /// A snapshot of a tracked light.
    pub async fn light(&self, light_id: &str) -> Option<Light> {
        self.registry.lock().await.get(light_id).cloned()
    }

    /// Bridge-local ids of all tracked lights.
    pub async fn light_ids(&self) -> Vec<String> {
        self.registry
            .lock()
            .await
            .light_ids()
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn credential(&self) -> Option<String> {
        self.credential.lock().unwrap().clone()
    }

    // Post-pairing discovery failures must not undo a successful pairing.
    async fn discover_logged(&self) {
        match self.discover().await {
            Ok(added) if !added.is_empty() => {
                debug!("bridge {}: discovered lights {added:?}", self.bridge_id);
            }
            Ok(_) => {}
            Err(e) => warn!("bridge {}: discovery failed: {e}", self.bridge_id),
        }
    }
}
