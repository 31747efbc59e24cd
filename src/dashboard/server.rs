use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use indicatif::ProgressBar;
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::pages::{self, Banner};
use crate::app::Config;
use crate::models::Backend;
use crate::runtime::{create_superset_document, query_all_models, ResponseStore};
use crate::utils::LmiError;

/// Shared state behind every dashboard request
#[derive(Clone)]
pub struct DashboardState {
    backend: Arc<dyn Backend>,
    config: Arc<Config>,
    store: ResponseStore,
}

impl DashboardState {
    pub fn new(backend: Arc<dyn Backend>, config: Config) -> Self {
        let store = ResponseStore::new(&config.output.responses_dir);
        Self {
            backend,
            config: Arc::new(config),
            store,
        }
    }
}

/// Failure of a dashboard request, rendered as an error banner
#[derive(Debug)]
pub enum DashboardError {
    Operation(LmiError),
    BadRequest(String),
}

impl From<LmiError> for DashboardError {
    fn from(error: LmiError) -> Self {
        DashboardError::Operation(error)
    }
}

impl DashboardError {
    fn status(&self) -> StatusCode {
        match self {
            DashboardError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DashboardError::Operation(error) => match error {
                LmiError::OutputExists(_) => StatusCode::CONFLICT,
                LmiError::InvalidOutputName(_) | LmiError::NoModels => StatusCode::BAD_REQUEST,
                LmiError::BackendNotRunning(_)
                | LmiError::ApiError(_)
                | LmiError::NetworkError(_)
                | LmiError::StreamError(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            DashboardError::BadRequest(message) => message.clone(),
            DashboardError::Operation(error) => error.to_string(),
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!("Dashboard request failed: {}", message);
        } else {
            tracing::warn!("Dashboard request rejected: {}", message);
        }
        (status, Html(pages::error_page(&message))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryForm {
    pub question: String,
    pub output_file: String,
}

/// Build the dashboard router
pub fn router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/models") }))
        .route("/models", get(list_models))
        .route("/query", get(query_form).post(query_submit))
        // Responses files are uploaded whole and may exceed the default 2 MiB
        .route(
            "/superset",
            get(superset_form)
                .post(superset_submit)
                .layer(DefaultBodyLimit::disable()),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve the dashboard until the process exits
pub async fn serve(state: DashboardState, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard to {}", addr))?;
    let local = listener.local_addr()?;

    println!("Dashboard running at http://{}", local);
    tracing::info!("Dashboard listening on {}", local);

    axum::serve(listener, router(state))
        .await
        .context("Dashboard server stopped")
}

async fn list_models(State(state): State<DashboardState>) -> Result<Html<String>, DashboardError> {
    let models = state.backend.list_models().await?;
    Ok(Html(pages::models_page(&models)))
}

async fn query_form() -> Html<String> {
    Html(pages::query_page(None))
}

async fn query_submit(
    State(state): State<DashboardState>,
    Form(form): Form<QueryForm>,
) -> Response {
    let result = query_all_models(
        state.backend.as_ref(),
        &state.store,
        state.config.output.separator_width,
        &form.question,
        &form.output_file,
        &ProgressBar::hidden(),
    )
    .await;

    match result {
        Ok(report) => {
            tracing::info!(
                "Dashboard query wrote {} section(s) to {}",
                report.sections.len(),
                report.path.display()
            );
            let banner = Banner::Success(format!(
                "Query completed successfully. Check the output file in the '{}' folder.",
                state.store.dir().display()
            ));
            Html(pages::query_page(Some(&banner))).into_response()
        }
        Err(error) => form_error(DashboardError::from(error), |banner| {
            pages::query_page(Some(banner))
        }),
    }
}

async fn superset_form(
    State(state): State<DashboardState>,
) -> Result<Html<String>, DashboardError> {
    let models = state.backend.list_models().await?;
    Ok(Html(pages::superset_page(&models, None)))
}

/// Fields of the superset multipart form
#[derive(Debug, Default)]
struct SupersetUpload {
    content: Option<String>,
    model: Option<String>,
    output_file: Option<String>,
}

async fn read_superset_upload(mut multipart: Multipart) -> Result<SupersetUpload, DashboardError> {
    let mut upload = SupersetUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DashboardError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "responses_file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| DashboardError::BadRequest(e.to_string()))?;
                let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                    DashboardError::BadRequest("Uploaded file is not valid UTF-8 text".to_string())
                })?;
                upload.content = Some(text);
            }
            "model" | "output_file" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| DashboardError::BadRequest(e.to_string()))?;
                if name == "model" {
                    upload.model = Some(value);
                } else {
                    upload.output_file = Some(value);
                }
            }
            _ => tracing::debug!("Ignoring unknown form field {}", name),
        }
    }

    Ok(upload)
}

async fn superset_submit(State(state): State<DashboardState>, multipart: Multipart) -> Response {
    match run_superset(&state, multipart).await {
        Ok(banner) => {
            let models = state.backend.list_models().await.unwrap_or_default();
            Html(pages::superset_page(&models, Some(&banner))).into_response()
        }
        Err(error) => {
            let models = state.backend.list_models().await.unwrap_or_default();
            form_error(error, |banner| pages::superset_page(&models, Some(banner)))
        }
    }
}

async fn run_superset(
    state: &DashboardState,
    multipart: Multipart,
) -> Result<Banner, DashboardError> {
    let upload = read_superset_upload(multipart).await?;

    let content = upload
        .content
        .ok_or_else(|| DashboardError::BadRequest("Upload a responses file first".to_string()))?;
    let model = upload
        .model
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| DashboardError::BadRequest("Select a model".to_string()))?;
    let output_file = upload.output_file.unwrap_or_default();

    create_superset_document(
        state.backend.as_ref(),
        &state.store,
        &state.config.superset.system_prompt,
        &content,
        &model,
        &output_file,
        &ProgressBar::hidden(),
    )
    .await?;

    Ok(Banner::Success(
        "Superset document created successfully.".to_string(),
    ))
}

/// Re-render a form page with the error as its banner
fn form_error(error: DashboardError, render: impl FnOnce(&Banner) -> String) -> Response {
    let status = error.status();
    let message = error.message();
    tracing::warn!("Dashboard form failed: {}", message);
    (status, Html(render(&Banner::Error(message)))).into_response()
}
