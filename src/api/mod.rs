//! HTTP API over the pitch service.
//!
//! | Endpoint | Operation |
//! |----------|-----------|
//! | `GET /pitch` | list every pitch |
//! | `POST /pitch` | register a pitch |
//! | `GET /pitch/{id}` | fetch one pitch |
//! | `PATCH /pitch/{id}` | partial update |
//! | `DELETE /pitch/{id}` | remove a pitch |
//! | `GET /pitch/{id}/analyze` | rain-damage evaluation |
//! | `GET /pitch/{id}/maintenance/done` | record maintenance |
//! | `GET /pitch/{id}/turf/changed` | record turf replacement |
//! | `GET /pitch/maintenance/needed` | pitches with maintenance scheduled |
//! | `GET /pitch/turf/replacement/needed` | pitches flagged for replacement |
//! | `POST /pitch/sweep` | evaluate every pitch |

mod extract;
mod routes;

use crate::config::Config;
use crate::datasources::{VisualCrossingClient, WeatherSource};
use crate::db::Database;
use crate::error::{PitchCareError, Result};
use crate::logic::{PitchService, TurfHealthEngine};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

const MAX_BODY_BYTES: usize = 64 * 1024;

pub struct AppState<W> {
    pub service: PitchService<W>,
}

impl PitchCareError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PitchCareError::InvalidIdentifier(_) | PitchCareError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            PitchCareError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PitchCareError::Conflict(_) => StatusCode::CONFLICT,
            PitchCareError::WeatherUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PitchCareError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router<W: WeatherSource + 'static>(state: Arc<AppState<W>>) -> Router {
    Router::new()
        .route(
            "/pitch",
            get(routes::list_pitches::<W>).post(routes::create_pitch::<W>),
        )
        .route("/pitch/sweep", post(routes::sweep::<W>))
        .route(
            "/pitch/maintenance/needed",
            get(routes::maintenance_needed::<W>),
        )
        .route(
            "/pitch/turf/replacement/needed",
            get(routes::replacement_needed::<W>),
        )
        .route(
            "/pitch/{id}",
            get(routes::get_pitch::<W>)
                .patch(routes::update_pitch::<W>)
                .delete(routes::delete_pitch::<W>),
        )
        .route("/pitch/{id}/analyze", get(routes::analyze_pitch::<W>))
        .route(
            "/pitch/{id}/maintenance/done",
            get(routes::maintenance_done::<W>),
        )
        .route("/pitch/{id}/turf/changed", get(routes::turf_changed::<W>))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

/// Serve the API on `server.bind` until interrupted.
pub async fn serve(config: &Config, db: Database) -> Result<()> {
    let addr = config.server.bind_addr()?;
    let client = VisualCrossingClient::new(config.weather.clone())?;
    let service = PitchService::new(db, TurfHealthEngine::new(client));
    let app = router(Arc::new(AppState { service }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("API shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl-C, shutting down");
}
