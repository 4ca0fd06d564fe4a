use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use skillgraph_core::AppError;
use skillgraph_domain::{CallerIdentity, TicketStatus};

use crate::dto::{CreateTicketRequest, TicketResponse, UpdateTicketRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_tickets_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Json<Vec<TicketResponse>>> {
    let tickets = state
        .support_service
        .list_tickets(&caller)
        .await?
        .into_iter()
        .map(TicketResponse::from)
        .collect();

    Ok(Json(tickets))
}

pub async fn create_ticket_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<CreateTicketRequest>,
) -> ApiResult<Json<TicketResponse>> {
    let ticket = state
        .support_service
        .create_ticket(&caller, request.subject, request.requester_email)
        .await?;

    Ok(Json(TicketResponse::from(ticket)))
}

pub async fn update_ticket_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTicketRequest>,
) -> ApiResult<Json<TicketResponse>> {
    let status = TicketStatus::from_str(request.status.as_str())?;
    let ticket = state
        .support_service
        .set_ticket_status(&caller, id.as_str(), status)
        .await?;

    Ok(Json(TicketResponse::from(ticket)))
}

pub async fn delete_ticket_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let removed = state
        .support_service
        .delete_ticket(&caller, id.as_str())
        .await?;

    if !removed {
        return Err(AppError::NotFound(format!("ticket '{id}' does not exist")).into());
    }

    Ok(StatusCode::NO_CONTENT)
}
