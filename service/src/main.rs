use std::{env, path::Path};

use abi::Config;
use anyhow::Result;
use hotel_service::HotelService;
use tokio::io::{self, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CONFIG: &str = "fixtures/config.yml";

#[tokio::main]
async fn main() -> Result<()> {
    init_logger()?;
    let config = load_config()?;
    let service = HotelService::from_config(&config).await?;

    service
        .run(BufReader::new(io::stdin()), io::stdout())
        .await?;

    if service.manager().is_unsaved().await {
        warn!("unsaved changes found on exit, flushing");
        service.manager().flush().await?;
    }
    Ok(())
}

/// `HOTEL_CONFIG` must point at a readable file when set. Without it the
/// bundled fixture is used if present, else the defaults.
fn load_config() -> Result<Config> {
    if let Ok(path) = env::var("HOTEL_CONFIG") {
        info!("loading config from {}", path);
        return Config::load(&path);
    }
    if Path::new(DEFAULT_CONFIG).exists() {
        return Config::load(DEFAULT_CONFIG);
    }
    warn!("no config file found, using defaults");
    Ok(Config::default())
}

fn init_logger() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());

    let subscriber = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(subscriber)
        .with(env_filter)
        .try_init()?;

    Ok(())
}
