use axum::Json;
use axum::extract::{Extension, Path, State};
use skillgraph_domain::CallerIdentity;

use crate::dto::JobResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_jobs_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Json<Vec<JobResponse>>> {
    let jobs = state
        .job_moderation_service
        .list_jobs(&caller)
        .await?
        .into_iter()
        .map(JobResponse::from)
        .collect();

    Ok(Json(jobs))
}

pub async fn approve_job_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let job = state
        .job_moderation_service
        .approve_job(&caller, id.as_str())
        .await?;

    Ok(Json(JobResponse::from(job)))
}

pub async fn reject_job_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let job = state
        .job_moderation_service
        .reject_job(&caller, id.as_str())
        .await?;

    Ok(Json(JobResponse::from(job)))
}
