//! The caller's saved-post collection. Every identity has at most one; it is
//! created lazily the first time it is read or written.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::info;
use uuid::Uuid;

use pixgram_db::models::SaveItemRow;
use pixgram_types::api::{AddSaveItemRequest, Claims};

use crate::auth::{AppState, AppStateInner};
use crate::error::{ApiError, ApiJson, ApiPath};
use crate::{blocking, views};

pub async fn get_save(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let view = blocking(&state, move |s| {
        let save = s.db.get_or_create_save(&uid)?;
        let items = s.db.list_save_items(&save.id)?;
        Ok(views::save(&save, &items))
    })
    .await?;
    Ok(Json(view))
}

pub async fn add_save_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): ApiJson<AddSaveItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let pid = req.post_id.to_string();
    let item = blocking(&state, move |s| {
        let save = s.db.get_or_create_save(&uid)?;
        Ok(s.db.add_save_item(&save.id, &pid)?)
    })
    .await?;

    info!(user = %claims.username, post = %req.post_id, "Saved post");
    Ok((StatusCode::CREATED, Json(views::save_item(&item))))
}

/// Loads an item from the caller's own collection.
fn owned_item(s: &AppStateInner, id: Uuid, caller: &str) -> Result<SaveItemRow, ApiError> {
    let item = s
        .db
        .get_save_item(&id.to_string())?
        .ok_or(ApiError::NotFound("save item"))?;
    if item.owner_id != caller {
        return Err(ApiError::Forbidden);
    }
    Ok(item)
}

pub async fn get_save_item(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = claims.sub.to_string();
    let item = blocking(&state, move |s| owned_item(s, id, &caller)).await?;
    Ok(Json(views::save_item(&item)))
}

pub async fn delete_save_item(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = claims.sub.to_string();
    blocking(&state, move |s| {
        let item = owned_item(s, id, &caller)?;
        Ok(s.db.delete_save_item(&item.id)?)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
