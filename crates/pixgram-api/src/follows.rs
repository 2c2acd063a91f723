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

use pixgram_db::queries::{FollowFilter, FollowOrdering};
use pixgram_types::api::{Claims, CreateFollowRequest};
use pixgram_types::views::{FollowView, UserSummaryView};

use crate::auth::AppState;
use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::{blocking, views};

#[derive(Debug, Deserialize)]
pub struct FollowQuery {
    pub follower: Option<Uuid>,
    pub following: Option<Uuid>,
    /// `follower`, `following`, or either with a leading `-` for descending.
    pub ordering: Option<String>,
}

pub async fn list_follows(
    State(state): State<AppState>,
    WithRejection(Query(query), _): ApiQuery<FollowQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ordering = query
        .ordering
        .as_deref()
        .map(|o| {
            FollowOrdering::parse(o).ok_or_else(|| ApiError::bad_request("unknown ordering field"))
        })
        .transpose()?;
    let filter = FollowFilter {
        follower: query.follower.map(|id| id.to_string()),
        following: query.following.map(|id| id.to_string()),
    };

    let rows = blocking(&state, move |s| Ok(s.db.list_follows(&filter, ordering)?)).await?;
    Ok(Json(rows.iter().map(views::follow).collect::<Vec<FollowView>>()))
}

/// POST /follows: the caller starts following `following`.
pub async fn create_follow(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): ApiJson<CreateFollowRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let follower = claims.sub.to_string();
    let following = req.following.to_string();

    let row = blocking(&state, move |s| {
        if s.db.get_user_by_id(&following)?.is_none() {
            return Err(ApiError::bad_request("user to follow does not exist"));
        }
        Ok(s.db.create_follow(&follower, &following)?)
    })
    .await?;

    info!(follower = %claims.username, following = %req.following, "New follow edge");
    Ok((StatusCode::CREATED, Json(views::follow(&row))))
}

pub async fn get_follow(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = blocking(&state, move |s| Ok(s.db.get_follow(&id.to_string())?))
        .await?
        .ok_or(ApiError::NotFound("follow"))?;
    Ok(Json(views::follow(&row)))
}

/// Only the follower can remove an edge.
pub async fn delete_follow(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = claims.sub.to_string();
    blocking(&state, move |s| {
        let edge = s
            .db
            .get_follow(&id.to_string())?
            .ok_or(ApiError::NotFound("follow"))?;
        if edge.follower_id != caller {
            return Err(ApiError::Forbidden);
        }
        Ok(s.db.delete_follow(&edge.id)?)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_followers(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, move |s| {
        let uid = id.to_string();
        if s.db.get_user_by_id(&uid)?.is_none() {
            return Err(ApiError::NotFound("user"));
        }
        Ok(s.db.list_followers(&uid)?)
    })
    .await?;
    Ok(Json(rows.iter().map(views::summary).collect::<Vec<UserSummaryView>>()))
}

pub async fn list_following(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, move |s| {
        let uid = id.to_string();
        if s.db.get_user_by_id(&uid)?.is_none() {
            return Err(ApiError::NotFound("user"));
        }
        Ok(s.db.list_following(&uid)?)
    })
    .await?;
    Ok(Json(rows.iter().map(views::summary).collect::<Vec<UserSummaryView>>()))
}
