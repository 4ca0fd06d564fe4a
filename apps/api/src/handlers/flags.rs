use axum::Json;
use axum::extract::{Extension, State};
use skillgraph_domain::CallerIdentity;

use crate::dto::{FlagResponse, SetFlagRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_flags_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Json<Vec<FlagResponse>>> {
    let flags = state
        .flag_service
        .list_flags(&caller)
        .await?
        .into_iter()
        .map(FlagResponse::from)
        .collect();

    Ok(Json(flags))
}

pub async fn set_flag_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<SetFlagRequest>,
) -> ApiResult<Json<FlagResponse>> {
    let flag = state
        .flag_service
        .set_flag(&caller, request.key.as_str(), request.enabled)
        .await?;

    Ok(Json(FlagResponse::from(flag)))
}
