//! Credential persistence on top of an external key-value store.

use std::collections::HashMap;
use std::future::Future;

use log::{debug, warn};
use tokio::sync::Mutex;

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Abstract key-value persistence collaborator.
///
/// The host environment supplies the actual storage engine; this crate
/// only needs get/set of string values under string keys. Implementations
/// are expected to be durable across process restarts.
pub trait Storage: Send + Sync {
    /// Read a value, `None` when the key has never been written.
    fn get_item(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Durably write a value.
    fn set_item(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> + Send;
}

/// A non-durable [`Storage`] for demos and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Maps bridge ids to acquired credentials, persisted as one JSON object
/// under a single fixed key.
///
/// Writes are read-modify-write: the whole table is re-read and merged
/// before every write so bridges paired through other store handles are
/// never clobbered. Entries are only ever added, never removed.
#[derive(Debug)]
pub struct CredentialStore<S: Storage> {
    storage: S,
}

impl<S: Storage> CredentialStore<S> {
    const KEY: &'static str = "hue.credentials";

    pub fn new(storage: S) -> Self {
        CredentialStore { storage }
    }

    /// Look up the credential for a bridge.
    ///
    /// An unreadable or missing table is reported as "not paired", never
    /// as an error; pairing recovers from both.
    pub async fn get(&self, bridge_id: &str) -> Option<String> {
        let table = self.read_table().await;
        table.get(bridge_id).cloned()
    }

    /// Persist a credential for a bridge, preserving all other entries.
    pub async fn put(&self, bridge_id: &str, credential: &str) -> Result<()> {
        let mut table = self.read_table().await;
        table.insert(bridge_id.to_string(), credential.to_string());

        let json = serde_json::to_string(&table).map_err(Error::JsonDump)?;
        self.storage.set_item(Self::KEY, &json).await?;
        debug!("stored credential for bridge {bridge_id}");
        Ok(())
    }

    async fn read_table(&self) -> HashMap<String, String> {
        let raw = match self.storage.get_item(Self::KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("credential store read failed: {e}");
                return HashMap::new();
            }
        };
        let Some(raw) = raw else {
            return HashMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(table) => table,
            Err(e) => {
                warn!("credential table is corrupt, starting empty: {e}");
                HashMap::new()
            }
        }
    }
}
