//! HTTP surface: carousel generation, single-slide rendering and ZIP export.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::{
    assets::text::FontBook,
    export::{export_slide, export_zip},
    foundation::error::{CarouselError, CarouselResult},
    generate::{generator::CarouselGenerator, request::CarouselRequest},
    render::cpu::CpuRenderer,
    slide::model::SlideRecord,
};

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub generator: CarouselGenerator,
    pub fonts: Arc<FontBook>,
    /// Default render scale when a request does not pass `?scale=`.
    pub scale: f32,
    /// Largest accepted request body; slides carry images as inline data URIs.
    pub max_body_bytes: usize,
}

/// Error body `{error, details}` with a status derived from the error variant.
#[derive(Debug)]
pub struct ApiError(pub CarouselError);

impl From<CarouselError> for ApiError {
    fn from(err: CarouselError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            CarouselError::Validation(_) => StatusCode::BAD_REQUEST,
            CarouselError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self.0 {
            CarouselError::Validation(_) => "invalid request",
            CarouselError::BackendUnavailable(_) => "generation backend unavailable",
            CarouselError::Generation(_) => "failed to generate carousel",
            CarouselError::Render(_) => "failed to render slide",
            _ => "internal error",
        };
        if status.is_server_error() {
            tracing::error!(%status, error = %self.0, "request failed");
        } else {
            tracing::debug!(%status, error = %self.0, "request rejected");
        }
        let body = serde_json::json!({ "error": error, "details": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SlidesBody {
    pub slides: Vec<SlideRecord>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct RenderQuery {
    pub scale: Option<f32>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/api/generate-carousel", post(generate_carousel))
        .route("/api/render", post(render_slide))
        .route("/api/export", post(export_carousel))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> CarouselResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("bind {addr}: {e}"))?;
    tracing::info!(addr, "carousel server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate_carousel(
    State(state): State<AppState>,
    Json(request): Json<CarouselRequest>,
) -> Result<Json<SlidesBody>, ApiError> {
    let slides = state.generator.generate(&request).await?;
    Ok(Json(SlidesBody { slides }))
}

/// Run a render job on the blocking pool with its own renderer.
async fn with_renderer<T, F>(state: &AppState, scale: f32, job: F) -> CarouselResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut CpuRenderer) -> CarouselResult<T> + Send + 'static,
{
    let fonts = Arc::clone(&state.fonts);
    tokio::task::spawn_blocking(move || {
        let mut renderer = CpuRenderer::new(&fonts, scale)?;
        job(&mut renderer)
    })
    .await
    .map_err(|e| CarouselError::render(format!("render task failed: {e}")))?
}

async fn render_slide(
    State(state): State<AppState>,
    Query(query): Query<RenderQuery>,
    Json(slide): Json<SlideRecord>,
) -> Result<Response, ApiError> {
    let scale = query.scale.unwrap_or(state.scale);
    let png = with_renderer(&state, scale, move |r| export_slide(r, &slide)).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

async fn export_carousel(
    State(state): State<AppState>,
    Json(body): Json<SlidesBody>,
) -> Result<Response, ApiError> {
    let scale = state.scale;
    let zip = with_renderer(&state, scale, move |r| export_zip(r, &body.slides)).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"carousel.zip\"",
            ),
        ],
        zip,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let s = |e| ApiError(e).status();
        assert_eq!(s(CarouselError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(
            s(CarouselError::backend_unavailable("x")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            s(CarouselError::generation("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(s(CarouselError::render("x")), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
