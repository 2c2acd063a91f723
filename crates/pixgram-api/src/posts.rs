use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use pixgram_db::models::Media;
use pixgram_db::queries::PostFilter;
use pixgram_types::api::{Claims, CreatePostRequest};
use pixgram_types::views::PostListView;

use crate::auth::AppState;
use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::{blocking, views};

#[derive(Debug, Deserialize)]
pub struct PostQuery {
    pub user: Option<Uuid>,
    pub description: Option<String>,
}

/// POST /post_create: a post owned by the caller. Needs an image or a video.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): ApiJson<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let media = Media::new(req.image, req.video);
    let uid = claims.sub.to_string();

    let detail = blocking(&state, move |s| {
        let row = s.db.create_post(&uid, &media, req.description.as_deref())?;
        Ok(views::post_detail(&s.db, row)?)
    })
    .await?;

    info!(user = %claims.username, "Created post");
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn list_posts(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<PostQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = PostFilter {
        user: query.user.map(|id| id.to_string()),
        description: query.description,
    };
    let rows = blocking(&state, move |s| Ok(s.db.list_posts(&filter)?)).await?;
    Ok(Json(rows.iter().map(views::post_list).collect::<Vec<PostListView>>()))
}

pub async fn get_post(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = blocking(&state, move |s| {
        let row = s
            .db
            .get_post(&id.to_string())?
            .ok_or(ApiError::NotFound("post"))?;
        Ok(views::post_detail(&s.db, row)?)
    })
    .await?;
    Ok(Json(detail))
}
