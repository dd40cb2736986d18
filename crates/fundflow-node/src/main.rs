//! fundflow-node — serves one FundFlow session over JSON-RPC.
//!
//! Startup sequence:
//!   1. Build the session state from seed params
//!   2. Start the lifecycle engine
//!   3. Start the JSON-RPC 2.0 server
//!   4. Run until Ctrl-C, then stop the server
//!
//! State lives in memory only; every start begins from the seed.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use fundflow_core::constants::GACHA_PULL_DELAY_MS;
use fundflow_core::types::UserId;
use fundflow_rpc::{RpcServer, RpcServerState};
use fundflow_seed::{apply_seed, SeedParams};
use fundflow_state::{EngineConfig, LifecycleEngine, StateStore};

#[derive(Parser, Debug)]
#[command(
    name = "fundflow-node",
    version,
    about = "FundFlow node — staged community project funding"
)]
struct Args {
    /// JSON-RPC listen address.
    #[arg(long, default_value = "127.0.0.1:8645")]
    rpc_addr: SocketAddr,

    /// Path to seed params JSON. Defaults to the demo user.
    #[arg(long)]
    seed_params: Option<PathBuf>,

    /// Gacha reveal delay in milliseconds.
    #[arg(long, default_value_t = GACHA_PULL_DELAY_MS)]
    gacha_delay_ms: u64,

    /// Fixed gacha RNG seed for reproducible pulls.
    #[arg(long)]
    rng_seed: Option<u64>,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            gacha_delay: Duration::from_millis(self.gacha_delay_ms),
            rng_seed: self.rng_seed,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,fundflow=debug")),
        )
        .init();

    let args = Args::parse();
    info!("FundFlow node starting");

    // ── Seed ──────────────────────────────────────────────────────────────────
    let params = load_seed_params(args.seed_params.as_ref())?;
    let mut store = StateStore::new();
    let summary = apply_seed(&mut store, &params, chrono::Utc::now().timestamp())
        .context("applying seed")?;
    info!(
        user = %summary.user,
        projects = summary.projects,
        posts = summary.posts,
        "session seeded"
    );

    // ── Engine ────────────────────────────────────────────────────────────────
    let config = args.engine_config();
    if config.rng_seed.is_some() {
        info!(seed = ?config.rng_seed, "gacha RNG seeded");
    }
    let engine = Arc::new(LifecycleEngine::new(store, config));

    // ── RPC server ────────────────────────────────────────────────────────────
    let rpc_state = Arc::new(RpcServerState {
        engine,
        user: UserId::new(params.user_id.clone()),
    });
    let (addr, rpc_handle) = RpcServer::new(rpc_state)
        .start(args.rpc_addr)
        .await
        .context("starting RPC server")?;

    info!(%addr, "node ready");
    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    info!("shutting down");
    if rpc_handle.stop().is_err() {
        warn!("RPC server already stopped");
    }
    rpc_handle.stopped().await;
    Ok(())
}

/// Load seed params from a JSON file, or fall back to the demo user.
fn load_seed_params(path: Option<&PathBuf>) -> anyhow::Result<SeedParams> {
    match path {
        Some(p) => SeedParams::from_file(p)
            .with_context(|| format!("loading seed params from {}", p.display())),
        None => {
            info!("no --seed-params given; using the demo user");
            Ok(SeedParams::default())
        }
    }
}
