use super::extract::ApiJson;
use super::AppState;
use crate::datasources::WeatherSource;
use crate::db::PitchFilter;
use crate::error::PitchCareError;
use crate::logic::{Evaluation, SweepReport};
use crate::models::{NewPitch, Pitch, PitchUpdate};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

type ApiResult<T> = std::result::Result<T, PitchCareError>;

/// Pitch after analysis with the outcome alongside.
#[derive(Serialize)]
pub(super) struct AnalysisResponse {
    #[serde(flatten)]
    pitch: Pitch,
    evaluation: Evaluation,
}

pub(super) async fn list_pitches<W: WeatherSource>(
    State(state): State<Arc<AppState<W>>>,
) -> ApiResult<Json<Vec<Pitch>>> {
    Ok(Json(state.service.list(PitchFilter::All)?))
}

pub(super) async fn create_pitch<W: WeatherSource>(
    State(state): State<Arc<AppState<W>>>,
    ApiJson(payload): ApiJson<NewPitch>,
) -> ApiResult<impl IntoResponse> {
    let pitch = state.service.create(payload)?;
    Ok((StatusCode::CREATED, Json(pitch)))
}

pub(super) async fn get_pitch<W: WeatherSource>(
    State(state): State<Arc<AppState<W>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Pitch>> {
    Ok(Json(state.service.get(&id)?))
}

pub(super) async fn update_pitch<W: WeatherSource>(
    State(state): State<Arc<AppState<W>>>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<PitchUpdate>,
) -> ApiResult<Json<Pitch>> {
    Ok(Json(state.service.update(&id, payload)?))
}

pub(super) async fn delete_pitch<W: WeatherSource>(
    State(state): State<Arc<AppState<W>>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.service.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn analyze_pitch<W: WeatherSource>(
    State(state): State<Arc<AppState<W>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<AnalysisResponse>> {
    let (pitch, evaluation) = state.service.analyze(&id).await?;
    Ok(Json(AnalysisResponse { pitch, evaluation }))
}

pub(super) async fn maintenance_done<W: WeatherSource>(
    State(state): State<Arc<AppState<W>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Pitch>> {
    Ok(Json(state.service.do_maintenance(&id)?))
}

pub(super) async fn turf_changed<W: WeatherSource>(
    State(state): State<Arc<AppState<W>>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Pitch>> {
    Ok(Json(state.service.change_turf(&id)?))
}

pub(super) async fn maintenance_needed<W: WeatherSource>(
    State(state): State<Arc<AppState<W>>>,
) -> ApiResult<Json<Vec<Pitch>>> {
    Ok(Json(state.service.maintenance_needed()?))
}

pub(super) async fn replacement_needed<W: WeatherSource>(
    State(state): State<Arc<AppState<W>>>,
) -> ApiResult<Json<Vec<Pitch>>> {
    Ok(Json(state.service.replacement_needed()?))
}

pub(super) async fn sweep<W: WeatherSource>(
    State(state): State<Arc<AppState<W>>>,
) -> ApiResult<Json<SweepReport>> {
    Ok(Json(state.service.sweep().await?))
}
