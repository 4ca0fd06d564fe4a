use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use skillgraph_application::ArticleUpdate;
use skillgraph_core::AppError;
use skillgraph_domain::CallerIdentity;

use crate::dto::{ArticleResponse, CreateArticleRequest, UpdateArticleRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_articles_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Json<Vec<ArticleResponse>>> {
    let articles = state
        .content_service
        .list_articles(&caller)
        .await?
        .into_iter()
        .map(ArticleResponse::from)
        .collect();

    Ok(Json(articles))
}

pub async fn create_article_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<CreateArticleRequest>,
) -> ApiResult<Json<ArticleResponse>> {
    let article = state
        .content_service
        .create_article(&caller, request.title, request.slug, request.content)
        .await?;

    Ok(Json(ArticleResponse::from(article)))
}

pub async fn update_article_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
    Json(request): Json<UpdateArticleRequest>,
) -> ApiResult<Json<ArticleResponse>> {
    let article = state
        .content_service
        .update_article(
            &caller,
            id.as_str(),
            ArticleUpdate {
                title: request.title,
                slug: request.slug,
                content: request.content,
            },
        )
        .await?;

    Ok(Json(ArticleResponse::from(article)))
}

pub async fn delete_article_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let removed = state
        .content_service
        .delete_article(&caller, id.as_str())
        .await?;

    if !removed {
        return Err(AppError::NotFound(format!("article '{id}' does not exist")).into());
    }

    Ok(StatusCode::NO_CONTENT)
}
