use axum::Json;
use axum::extract::{Extension, Query, State};
use skillgraph_domain::{CallerIdentity, Permission, PermissionVerb, Resource};

use crate::dto::{AuditLogQuery, AuditPageResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<AuditLogQuery>,
) -> ApiResult<Json<AuditPageResponse>> {
    // The trail itself carries no guard; the read permission is enforced here.
    state.authorization_service.require(
        &caller,
        &Permission::new(Resource::Audit, PermissionVerb::Read),
    )?;

    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(50).clamp(1, 200);
    let result = state.audit_trail.list(page, page_size).await;

    Ok(Json(AuditPageResponse::from_page(result, page, page_size)))
}
