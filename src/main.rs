mod config;
mod entity;
mod error;
mod money;
mod notify;
mod prelude;
mod server;
mod state;
mod sv;
mod utils;

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{config::Config, prelude::*, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "cardroom=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  info!("Starting cardroom ledger v{}", env!("CARGO_PKG_VERSION"));

  let config = Config::from_env();
  let app = Arc::new(AppState::new(config).await?);

  server::start(app).await?;

  tokio::signal::ctrl_c().await?;
  info!("Shutting down");

  Ok(())
}
