use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use skillgraph_application::UserListQuery;
use skillgraph_domain::CallerIdentity;

use crate::dto::{
    ListUsersQuery, SetUserActiveRequest, SetUserRolesRequest, UserPageResponse, UserResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<UserPageResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).clamp(1, 100);

    let result = state
        .user_admin_service
        .list_users(
            &caller,
            UserListQuery {
                search: query.q,
                offset: (page - 1) * page_size,
                limit: page_size,
            },
        )
        .await?;

    Ok(Json(UserPageResponse::from(result)))
}

pub async fn set_user_active_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    Json(request): Json<SetUserActiveRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_admin_service
        .set_user_active(&caller, id.as_str(), request.active)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn set_user_roles_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    Json(request): Json<SetUserRolesRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_admin_service
        .set_user_roles(&caller, id.as_str(), request.roles)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn verify_user_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_admin_service
        .verify_user(&caller, id.as_str())
        .await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn reset_user_onboarding_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_admin_service
        .reset_user_onboarding(&caller, id.as_str())
        .await?;

    Ok(Json(UserResponse::from(user)))
}
