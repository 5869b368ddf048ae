use std::error::Error;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use train_status::config::AppConfig;
use train_status::ntes::{FixtureFetcher, NtesClient, Upstream};
use train_status::web::{AppState, create_router};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "train_status=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env()?;

    let upstream = match &config.fixture_dir {
        Some(dir) => {
            warn!(dir = %dir.display(), "serving running status from fixtures");
            Upstream::Fixture(FixtureFetcher::new(dir))
        }
        None => {
            let client = NtesClient::new(config.ntes_config())?;
            info!(
                base_url = client.base_url(),
                timeout_secs = config.ntes_timeout_secs,
                max_concurrent = config.ntes_max_concurrent,
                "using live NTES"
            );
            Upstream::Live(client)
        }
    };

    let app = create_router(AppState::new(upstream));

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "train status API listening");
    info!("  GET /                     - Welcome");
    info!("  GET /health               - Health check");
    info!("  GET /train/:train_number  - Running status (?start_time=&end_time=)");

    axum::serve(listener, app).await?;
    Ok(())
}
