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
use pixgram_types::api::{Claims, CreateChatRequest, SendMessageRequest};
use pixgram_types::views::{ChatView, MessageView};

use crate::auth::{AppState, AppStateInner};
use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::{blocking, views};

const MAX_PAGE: u32 = 200;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Id of the oldest message from the previous page.
    pub before: Option<Uuid>,
}

fn default_limit() -> u32 {
    50
}

/// 404 for an unknown chat, 403 when the caller is not a participant.
fn ensure_member(s: &AppStateInner, chat_id: &str, user_id: &str) -> Result<(), ApiError> {
    if s.db.get_chat(chat_id)?.is_none() {
        return Err(ApiError::NotFound("chat"));
    }
    if !s.db.is_chat_member(chat_id, user_id)? {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

pub async fn list_chats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let chats = blocking(&state, move |s| {
        let mut out = Vec::new();
        for row in s.db.list_chats_for_user(&uid)? {
            let members = s.db.chat_members(&row.id)?;
            out.push(views::chat(&row, &members));
        }
        Ok(out)
    })
    .await?;
    Ok(Json::<Vec<ChatView>>(chats))
}

/// POST /chats: the caller is always a participant.
pub async fn create_chat(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): ApiJson<CreateChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut members = vec![claims.sub.to_string()];
    members.extend(req.members.iter().map(Uuid::to_string));

    let view = blocking(&state, move |s| {
        let row = s.db.create_chat(&members)?;
        let members = s.db.chat_members(&row.id)?;
        Ok(views::chat(&row, &members))
    })
    .await?;

    info!(user = %claims.username, chat = %view.id, members = view.members.len(), "Opened chat");
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_messages(
    State(state): State<AppState>,
    WithRejection(Path(chat_id), _): ApiPath<Uuid>,
    WithRejection(Query(query), _): ApiQuery<MessageQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let cid = chat_id.to_string();
    let uid = claims.sub.to_string();
    let limit = query.limit.min(MAX_PAGE);
    let before = query.before.map(|id| id.to_string());

    let rows = blocking(&state, move |s| {
        ensure_member(s, &cid, &uid)?;
        Ok(s.db.list_messages(&cid, limit, before.as_deref())?)
    })
    .await?;

    Ok(Json(rows.into_iter().map(views::message).collect::<Vec<MessageView>>()))
}

pub async fn send_message(
    State(state): State<AppState>,
    WithRejection(Path(chat_id), _): ApiPath<Uuid>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): ApiJson<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cid = chat_id.to_string();
    let uid = claims.sub.to_string();
    let media = Media::new(req.image, req.video);

    let row = blocking(&state, move |s| {
        ensure_member(s, &cid, &uid)?;
        Ok(s.db.insert_message(&cid, &uid, &req.text, &media)?)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(views::message(row))))
}
