use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use skillgraph_core::AppError;
use skillgraph_domain::CallerIdentity;

use crate::dto::{
    AddTrackStepRequest, AssignTrackUsersRequest, CreateTrackRequest, TrackResponse,
    UpdateTrackRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_tracks_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Json<Vec<TrackResponse>>> {
    let tracks = state
        .track_service
        .list_tracks(&caller)
        .await?
        .into_iter()
        .map(TrackResponse::from)
        .collect();

    Ok(Json(tracks))
}

pub async fn create_track_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<CreateTrackRequest>,
) -> ApiResult<Json<TrackResponse>> {
    let track = state
        .track_service
        .create_track(&caller, request.name)
        .await?;

    Ok(Json(TrackResponse::from(track)))
}

pub async fn update_track_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTrackRequest>,
) -> ApiResult<Json<TrackResponse>> {
    let track = state
        .track_service
        .rename_track(&caller, id.as_str(), request.name)
        .await?;

    Ok(Json(TrackResponse::from(track)))
}

pub async fn add_track_step_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    Json(request): Json<AddTrackStepRequest>,
) -> ApiResult<Json<TrackResponse>> {
    let track = state
        .track_service
        .add_track_step(&caller, id.as_str(), request.title, request.description)
        .await?;

    Ok(Json(TrackResponse::from(track)))
}

pub async fn remove_track_step_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path((id, step_id)): Path<(String, String)>,
) -> ApiResult<Json<TrackResponse>> {
    let track = state
        .track_service
        .remove_track_step(&caller, id.as_str(), step_id.as_str())
        .await?;

    Ok(Json(TrackResponse::from(track)))
}

pub async fn assign_track_users_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    Json(request): Json<AssignTrackUsersRequest>,
) -> ApiResult<Json<TrackResponse>> {
    let track = state
        .track_service
        .assign_track_users(&caller, id.as_str(), request.user_ids)
        .await?;

    Ok(Json(TrackResponse::from(track)))
}

pub async fn delete_track_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let removed = state
        .track_service
        .delete_track(&caller, id.as_str())
        .await?;

    if !removed {
        return Err(AppError::NotFound(format!("track '{id}' does not exist")).into());
    }

    Ok(StatusCode::NO_CONTENT)
}
