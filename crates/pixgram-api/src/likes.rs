//! Post and comment likes. Each (user, target) pair has one toggle row:
//! create it once, then flip it with PUT.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::info;
use uuid::Uuid;

use pixgram_types::api::{
    Claims, CreateCommentLikeRequest, CreatePostLikeRequest, UpdateLikeRequest,
};
use pixgram_types::views::{CommentLikeListView, PostLikeListView};

use crate::auth::AppState;
use crate::error::{ApiError, ApiJson, ApiPath};
use crate::{blocking, views};

// -- Post likes --

pub async fn list_post_likes(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, |s| Ok(s.db.list_post_likes()?)).await?;
    Ok(Json(rows.iter().map(views::post_like_list).collect::<Vec<PostLikeListView>>()))
}

pub async fn create_post_like(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): ApiJson<CreatePostLikeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let pid = req.post.to_string();
    let row = blocking(&state, move |s| Ok(s.db.create_post_like(&uid, &pid, req.like)?)).await?;

    info!(user = %claims.username, post = %req.post, like = req.like, "Post like row created");
    Ok((StatusCode::CREATED, Json(views::post_like_list(&row))))
}

pub async fn get_post_like(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = blocking(&state, move |s| Ok(s.db.get_post_like(&id.to_string())?))
        .await?
        .ok_or(ApiError::NotFound("post like"))?;
    Ok(Json(views::post_like_detail(&row)))
}

/// PUT /post_like/{id}: flip the caller's own like row in place.
pub async fn update_post_like(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): ApiJson<UpdateLikeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = claims.sub.to_string();
    let row = blocking(&state, move |s| {
        let existing = s
            .db
            .get_post_like(&id.to_string())?
            .ok_or(ApiError::NotFound("post like"))?;
        if existing.user_id != caller {
            return Err(ApiError::Forbidden);
        }
        Ok(s.db.set_post_like(&existing.id, req.like)?)
    })
    .await?;
    Ok(Json(views::post_like_list(&row)))
}

// -- Comment likes --

pub async fn list_comment_likes(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, |s| Ok(s.db.list_comment_likes()?)).await?;
    Ok(Json(rows.iter().map(views::comment_like_list).collect::<Vec<CommentLikeListView>>()))
}

pub async fn create_comment_like(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): ApiJson<CreateCommentLikeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let cid = req.comment.to_string();
    let row = blocking(&state, move |s| Ok(s.db.create_comment_like(&uid, &cid, req.like)?)).await?;

    info!(
        user = %claims.username,
        comment = %req.comment,
        like = req.like,
        "Comment like row created"
    );
    Ok((StatusCode::CREATED, Json(views::comment_like_list(&row))))
}

pub async fn get_comment_like(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = blocking(&state, move |s| Ok(s.db.get_comment_like(&id.to_string())?))
        .await?
        .ok_or(ApiError::NotFound("comment like"))?;
    Ok(Json(views::comment_like_detail(&row)))
}

pub async fn update_comment_like(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): ApiJson<UpdateLikeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = claims.sub.to_string();
    let row = blocking(&state, move |s| {
        let existing = s
            .db
            .get_comment_like(&id.to_string())?
            .ok_or(ApiError::NotFound("comment like"))?;
        if existing.user_id != caller {
            return Err(ApiError::Forbidden);
        }
        Ok(s.db.set_comment_like(&existing.id, req.like)?)
    })
    .await?;
    Ok(Json(views::comment_like_list(&row)))
}
