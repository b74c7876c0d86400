use anyhow::Result;
use sentiment_web::{config, server};
use tracing::info;

/// Rejects a level the subscriber would silently ignore.
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // The log level lives in the config, so it is read before tracing is up
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over server.logs.level
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());

    if let Err(e) = validate_log_level(&log_level) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!(
        "Starting sentiment server v{} with log level: {}",
        env!("CARGO_PKG_VERSION"),
        log_level
    );

    info!(
        storage = config.storage.enabled,
        bucket = %config.storage.bucket,
        model_dir = %config.model.dir,
        "Fetching model artifacts, then loading the classifier before serving"
    );
    // A missing required artifact ends the process here
    server::run(config).await?;

    Ok(())
}
