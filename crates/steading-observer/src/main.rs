//! The `steading-server` binary: configuration, world generation, the
//! tick scheduler, the simulation loop, and the control surface HTTP
//! server.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

use steading_core::scheduler::TickScheduler;
use steading_core::{SimConfig, SimState};
use steading_observer::{AppState, build_router, tick_loop};
use steading_planner::HttpPlanner;
use steading_world::{GenerateParams, generate};

/// Environment variable naming the YAML config file.
const CONFIG_ENV: &str = "STEADING_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => SimConfig::load(std::path::Path::new(&path))
            .with_context(|| format!("loading config from {path}"))?,
        Err(_) => SimConfig::default(),
    };

    let registry = generate(&GenerateParams {
        size: config.world.size,
        agent_count: config.world.agent_count,
        resource_density: config.world.resource_density,
        seed: config.world.seed,
    })
    .context("generating the starting world")?;
    info!(
        agents = registry.agent_count(),
        entities = registry.entity_count(),
        "starting world ready"
    );

    let planner = Arc::new(HttpPlanner::new(&config.planner_url));
    let bind_address = config.bind_address.clone();
    let mut scheduler = TickScheduler::new(config.base_tick_interval_ms);
    let sim = Arc::new(RwLock::new(SimState::new(registry, config)));
    let app = AppState::new(Arc::clone(&sim), scheduler.handle(), Arc::clone(&planner));

    let ticks = scheduler.subscribe();
    tokio::spawn(tick_loop(
        app.clone(),
        Arc::clone(&sim),
        planner,
        ticks,
    ));
    scheduler
        .start()
        .context("starting the tick scheduler")?;

    let router = build_router(app);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding {bind_address}"))?;
    info!(%bind_address, "control surface listening");
    axum::serve(listener, router)
        .await
        .context("serving the control surface")?;

    scheduler.stop();
    Ok(())
}
