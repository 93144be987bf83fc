//! Hexroll Mesh Simulator
//!
//! Lay tiles out in a spiral, press every button, run until the mesh settles
//! and optionally serve the recorded timeline.
//!
//! Usage: `hexroll-sim [tiles] [max_ticks] [port]`

use std::env;

use hexroll_sim::{InspectServer, SimEvent, Simulation, SimulationConfig};
use hexroll_topology::Layout;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hexroll_sim=info,hexroll_protocol=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();
    let tiles: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(7);
    let max_ticks: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(2_000);
    let port: Option<u16> = args.get(3).and_then(|s| s.parse().ok());

    let config = SimulationConfig::from_env()?;
    tracing::info!(tiles, max_ticks, seed = config.seed, loss_rate = config.loss_rate, "starting");

    let layout = Layout::spiral(tiles);
    config.check_layout(&layout)?;
    tracing::info!(
        diameter = layout.diameter(),
        connected = layout.is_connected(),
        "layout ready"
    );

    let mut sim = Simulation::with_layout(config, &layout)?;

    let colored = sim.run_until(|s| s.color_conflicts() == 0, max_ticks);
    match colored {
        Some(ticks) => tracing::info!(ticks, "colors settled"),
        None => tracing::warn!(conflicts = sim.color_conflicts(), "colors still colliding"),
    }

    sim.press_all();
    match sim.run_until(Simulation::is_settled, max_ticks) {
        Some(ticks) => {
            let lost = sim
                .events()
                .iter()
                .filter(|e| matches!(e, SimEvent::Outrolled { .. }))
                .count();
            tracing::info!(
                ticks,
                highest = sim.highest_outcome().unwrap_or(0),
                winners = sim.tile_count().saturating_sub(lost),
                "mesh settled"
            );
        }
        None => tracing::warn!(max_ticks, "mesh did not settle"),
    }
    tracing::info!(
        events = sim.event_count(),
        delivered = sim.medium().delivered(),
        dropped = sim.medium().dropped(),
        "run complete"
    );

    if let Some(port) = port {
        InspectServer::new(sim).serve(port).await?;
    }

    Ok(())
}
