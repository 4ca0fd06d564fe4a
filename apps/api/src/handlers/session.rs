use axum::Json;
use axum::extract::{Extension, State};
use skillgraph_domain::CallerIdentity;

use crate::dto::MeResponse;
use crate::state::AppState;

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Json<MeResponse> {
    let permissions = state
        .authorization_service
        .grants_for(caller.role())
        .iter()
        .map(|permission| permission.as_str().to_owned())
        .collect();

    Json(MeResponse {
        subject: caller.subject().to_owned(),
        role: caller.role().map(|role| role.as_str().to_owned()),
        permissions,
        read_only: state.authorization_service.is_read_only(&caller),
    })
}
