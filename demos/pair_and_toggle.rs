//! Pair with a Hue bridge, then toggle every discovered light.
//!
//! This example demonstrates:
//! - The time-boxed pairing handshake (press the bridge's link button!)
//! - Light discovery and optimistic property updates
//!
//! Run with: cargo run --example pair_and_toggle -- --address 192.168.1.2

use std::time::Duration;

use clap::Parser;
use serde_json::json;

use hue_lights_rs::{BridgeAdapter, Device, MemoryStore, PairingOutcome};

#[derive(Parser)]
struct Args {
    /// Bridge IP address or hostname
    #[arg(long)]
    address: String,

    /// Bridge identifier used for the credential record
    #[arg(long, default_value = "demo-bridge")]
    bridge_id: String,

    /// Pairing window in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    // A real gateway plugs its persistent store in here; the in-memory
    // store means this demo pairs fresh on every run.
    let adapter = BridgeAdapter::new(&args.bridge_id, &args.address, MemoryStore::new())?;

    adapter.boot().await?;
    if !adapter.is_paired() {
        println!("Press the link button on the bridge...");
        match adapter
            .start_pairing(Duration::from_secs(args.timeout))
            .await?
        {
            PairingOutcome::Succeeded(_) => println!("Paired."),
            outcome => {
                println!("Pairing did not complete: {outcome:?}");
                return Ok(());
            }
        }
    }

    let ids = adapter.light_ids().await;
    println!("Found {} light(s)", ids.len());

    for id in ids {
        let Some(light) = adapter.light(&id).await else {
            continue;
        };
        let target = !light.on();
        println!(
            "  {} ({}): {} -> {}",
            light.name(),
            light.id(),
            light.on(),
            target
        );
        adapter.set_property(&id, "on", &json!(target)).await?;
    }

    Ok(())
}
