pub mod handlers;
mod page;
mod types;

pub use page::{PageRenderer, PageView};
pub use types::{AnalyzeForm, AnalyzeRequest, AnalyzeResponse, ErrorResponse};

use crate::{
    Result,
    assets::{self, FetchReport},
    config::Config,
    model::SentimentClassifier,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(state: handlers::AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::analyze_form))
        .route("/api/analyze", post(handlers::analyze_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let model_dir = PathBuf::from(&config.model.dir);

    // Fetch model artifacts
    let report = if config.storage.enabled {
        let store = assets::create_store(&config.storage).await?;
        let artifacts = assets::model_artifacts(&config.storage.prefix, &model_dir);
        assets::fetch_artifacts(store.as_ref(), &model_dir, &artifacts).await?
    } else {
        info!(
            "Remote storage disabled, using {} as-is",
            model_dir.display()
        );
        FetchReport::default()
    };

    // Load the classifier once; it is shared read-only by every request
    let load_dir = model_dir.clone();
    let classifier =
        tokio::task::spawn_blocking(move || SentimentClassifier::load(&load_dir, &report)).await??;

    let app_state = handlers::AppState::new(Arc::new(classifier))?;
    let app = router(app_state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
