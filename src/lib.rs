//! # hue_lights_rs
//!
//! An async Rust library for pairing with and controlling Philips Hue
//! bridges over their local REST API.
//!
//! This crate covers the lifecycle a home-automation gateway needs per
//! bridge: a time-boxed pairing handshake against the bridge's link
//! button, persistence of the acquired credential, discovery of the
//! bridge's lights, and bidirectional synchronization of each light's
//! on/off and color state.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use serde_json::json;
//! use hue_lights_rs::{BridgeAdapter, MemoryStore};
//!
//! async fn run() -> Result<(), hue_lights_rs::Error> {
//!     let adapter = BridgeAdapter::new("001788fffe123456", "192.168.1.2", MemoryStore::new())?;
//!
//!     // Reuses a stored credential, or waits for the link button.
//!     adapter.boot().await?;
//!     if !adapter.is_paired() {
//!         adapter.start_pairing(Duration::from_secs(30)).await?;
//!     }
//!
//!     // Turn the first discovered light red.
//!     if let Some(id) = adapter.light_ids().await.first() {
//!         adapter.set_property(id, "color", &json!("#ff0000")).await?;
//!         adapter.set_property(id, "on", &json!(true)).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Pairing**: Retry-until-deadline link button handshake with
//!   cooperative cancellation via [`BridgeAdapter::start_pairing`]
//! - **Credential Persistence**: Bridge credentials survive restarts
//!   through any [`Storage`] implementation
//! - **Discovery**: One tracked [`Light`] per bridge light, created once
//! - **State Sync**: Local property changes are pushed optimistically;
//!   failed pushes never block the next change
//! - **Colors**: Lossy conversion between the bridge's hue/sat/bri
//!   encoding and hex RGB via [`BridgeColor`] and [`HexColor`]
//!
//! ## Communication
//!
//! All communication with a bridge uses its local HTTP REST API. The
//! bridge must be reachable on the local network, and pairing requires a
//! physical press of its link button within the pairing window.
//!
//! ## What this crate does not do
//!
//! Color temperature, effects, scenes, and groups are out of scope, as
//! is pruning lights that disappear from the bridge.

mod adapter;
mod bridge;
mod color;
mod errors;
mod light;
mod pairing;
mod payload;
mod registry;
mod store;
mod sync;

// Re-export public API
pub use adapter::BridgeAdapter;
pub use bridge::{BridgeClient, LightInfo, LightState};
pub use color::{BridgeColor, HexColor};
pub use errors::Error;
pub use light::{Device, Light, PROP_COLOR, PROP_ON};
pub use pairing::{PairingOutcome, PairingSession, PairingState};
pub use payload::StatePayload;
pub use registry::LightRegistry;
pub use store::{CredentialStore, MemoryStore, Storage};
pub use sync::SyncEngine;
