use super::page::{PageRenderer, PageView};
use super::types::{AnalyzeForm, AnalyzeRequest, AnalyzeResponse, ErrorResponse};
use crate::{
    Result,
    analysis::{Analysis, Analyzer},
    model::SentimentModel,
};
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, Json},
};
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub page: Arc<PageRenderer>,
}

impl AppState {
    pub fn new(model: Arc<dyn SentimentModel>) -> Result<Self> {
        Ok(Self {
            analyzer: Analyzer::new(model),
            page: Arc::new(PageRenderer::new()?),
        })
    }
}

type HtmlError = (StatusCode, Html<String>);

pub async fn index(State(state): State<AppState>) -> std::result::Result<Html<String>, HtmlError> {
    render(&state.page, &PageView::default())
}

pub async fn analyze_form(
    State(state): State<AppState>,
    Form(form): Form<AnalyzeForm>,
) -> std::result::Result<Html<String>, HtmlError> {
    match run_analysis(&state.analyzer, form.text.clone()).await {
        Ok(analysis) => render(&state.page, &PageView::with_analysis(form.text, analysis)),
        Err(e) => {
            let view = PageView::with_error(form.text, format!("Analysis failed: {}", e));
            let body = render(&state.page, &view)?;
            Err((StatusCode::INTERNAL_SERVER_ERROR, body))
        }
    }
}

pub async fn analyze_json(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> std::result::Result<Json<AnalyzeResponse>, (StatusCode, Json<ErrorResponse>)> {
    match run_analysis(&state.analyzer, request.text).await {
        Ok(analysis) => Ok(Json(analysis.into())),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Analysis failed: {}", e),
            }),
        )),
    }
}

/// Runs the blocking pipeline off the async workers, once.
async fn run_analysis(analyzer: &Analyzer, text: String) -> Result<Analysis> {
    let request_id = Uuid::new_v4();
    let span = info_span!("analysis", %request_id);
    info!(parent: &span, "Received analysis request ({} chars)", text.chars().count());

    let analyzer = analyzer.clone();
    let blocking_span = span.clone();
    tokio::task::spawn_blocking(move || blocking_span.in_scope(|| analyzer.analyze(&text)))
        .instrument(span)
        .await?
}

fn render(page: &PageRenderer, view: &PageView) -> std::result::Result<Html<String>, HtmlError> {
    page.render(view).map(Html).map_err(|e| {
        error!("Failed to render page: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("<h1>Internal error</h1><p>{}</p>", e)),
        )
    })
}
