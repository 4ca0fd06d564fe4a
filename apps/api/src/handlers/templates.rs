use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use skillgraph_application::CreateTemplateInput;
use skillgraph_core::AppError;
use skillgraph_domain::{CallerIdentity, TemplateKind};

use crate::dto::{
    AddTemplateVersionRequest, CreateTemplateRequest, RollbackTemplateRequest, TemplateResponse,
    UpdateTemplateRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_templates_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Json<Vec<TemplateResponse>>> {
    let templates = state
        .template_service
        .list_templates(&caller)
        .await?
        .into_iter()
        .map(TemplateResponse::from)
        .collect();

    Ok(Json(templates))
}

pub async fn create_template_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<CreateTemplateRequest>,
) -> ApiResult<Json<TemplateResponse>> {
    let template = state
        .template_service
        .create_template(
            &caller,
            CreateTemplateInput {
                name: request.name,
                kind: TemplateKind::from_str(request.kind.as_str())?,
                body: request.body,
            },
        )
        .await?;

    Ok(Json(TemplateResponse::from(template)))
}

pub async fn update_template_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTemplateRequest>,
) -> ApiResult<Json<TemplateResponse>> {
    let kind = request
        .kind
        .as_deref()
        .map(TemplateKind::from_str)
        .transpose()?;

    let template = state
        .template_service
        .update_template(&caller, id.as_str(), request.name, kind)
        .await?;

    Ok(Json(TemplateResponse::from(template)))
}

pub async fn add_template_version_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    Json(request): Json<AddTemplateVersionRequest>,
) -> ApiResult<Json<TemplateResponse>> {
    let template = state
        .template_service
        .add_template_version(&caller, id.as_str(), request.body)
        .await?;

    Ok(Json(TemplateResponse::from(template)))
}

pub async fn rollback_template_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    Json(request): Json<RollbackTemplateRequest>,
) -> ApiResult<Json<TemplateResponse>> {
    let template = state
        .template_service
        .rollback_template(&caller, id.as_str(), request.version)
        .await?;

    Ok(Json(TemplateResponse::from(template)))
}

pub async fn delete_template_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let removed = state
        .template_service
        .delete_template(&caller, id.as_str())
        .await?;

    if !removed {
        return Err(AppError::NotFound(format!("template '{id}' does not exist")).into());
    }

    Ok(StatusCode::NO_CONTENT)
}
