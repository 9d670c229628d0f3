use anyhow::{Context, Result};
use atelier_core::Config;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;

    let (_state, router) = atelier_api::setup::initialize_app(config.clone()).await?;

    atelier_api::setup::server::start_server(&config, router).await
}
