use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::info;
use uuid::Uuid;

use pixgram_db::models::Media;
use pixgram_types::api::{Claims, CreateStoryRequest};
use pixgram_types::views::StoryListView;

use crate::auth::AppState;
use crate::error::{ApiError, ApiJson, ApiPath};
use crate::{blocking, views};

pub async fn list_stories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, |s| Ok(s.db.list_stories()?)).await?;
    Ok(Json(rows.iter().map(views::story_list).collect::<Vec<StoryListView>>()))
}

pub async fn create_story(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): ApiJson<CreateStoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let media = Media::new(req.image, req.video);
    let uid = claims.sub.to_string();

    let row = blocking(&state, move |s| Ok(s.db.create_story(&uid, &media)?)).await?;

    info!(user = %claims.username, "Created story");
    Ok((StatusCode::CREATED, Json(views::story_list(&row))))
}

pub async fn get_story(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = blocking(&state, move |s| Ok(s.db.get_story(&id.to_string())?))
        .await?
        .ok_or(ApiError::NotFound("story"))?;
    Ok(Json(views::story_detail(&row)))
}
