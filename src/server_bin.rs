use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use connect_core::config::AppConfig;
use connect_core::online_game::handlers::{routes, ServerState};
use connect_core::Arbiter;

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("connect.toml"));
    let config = AppConfig::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?
        .with_env_overrides();
    debug!("Config: {:?}", config);

    let state = Arc::new(ServerState {
        arbiter: Arbiter::new(),
        defaults: config.game.clone(),
    });

    let address = config.server.address();
    info!("It's server! Listening on {}", address);
    warp::serve(routes(state)).run(address).await;
    Ok(())
}
