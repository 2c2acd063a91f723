use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::info;
use uuid::Uuid;

use pixgram_types::api::{Claims, CreateCommentRequest};
use pixgram_types::views::CommentListView;

use crate::auth::AppState;
use crate::error::{ApiError, ApiJson, ApiPath};
use crate::{blocking, views};

pub async fn list_comments(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, |s| Ok(s.db.list_comments()?)).await?;
    Ok(Json(rows.iter().map(views::comment_list).collect::<Vec<CommentListView>>()))
}

/// POST /comment/create: `parent` makes this a reply on the same post.
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): ApiJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let pid = req.post.to_string();
    let parent = req.parent.map(|p| p.to_string());
    let text = req.text.filter(|t| !t.trim().is_empty());

    let row = blocking(&state, move |s| {
        Ok(s.db.create_comment(&uid, &pid, text.as_deref(), parent.as_deref())?)
    })
    .await?;

    info!(user = %claims.username, post = %req.post, reply = req.parent.is_some(), "New comment");
    Ok((StatusCode::CREATED, Json(views::comment_list(&row))))
}

pub async fn get_comment(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = blocking(&state, move |s| {
        let row = s
            .db
            .get_comment(&id.to_string())?
            .ok_or(ApiError::NotFound("comment"))?;
        Ok(views::comment_detail(&s.db, row)?)
    })
    .await?;
    Ok(Json(detail))
}
