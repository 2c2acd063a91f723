use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::info;
use uuid::Uuid;

use pixgram_db::models::ProfileFields;
use pixgram_types::api::{Claims, ProfileInput, UpdateUserRequest};

use crate::auth::AppState;
use crate::error::{ApiError, ApiJson, ApiPath};
use crate::{blocking, views};

/// Validate wire-level profile input and build the store's field set.
pub(crate) fn profile_fields(input: ProfileInput) -> Result<ProfileFields, ApiError> {
    let ProfileInput {
        username,
        email,
        first_name,
        last_name,
        age,
        phone_number,
        bio,
        image,
        website,
    } = input;
    let username = username.trim().to_string();
    if username.len() < 3 || username.len() > 32 {
        return Err(ApiError::bad_request("username must be 3 to 32 characters"));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '@' | '+'))
    {
        return Err(ApiError::bad_request("username contains invalid characters"));
    }
    if let Some(email) = email.as_deref() {
        if !email.contains('@') {
            return Err(ApiError::bad_request("enter a valid email address"));
        }
    }
    if let Some(phone) = phone_number.as_deref() {
        let digits = phone.strip_prefix('+').unwrap_or(phone);
        if !(7..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ApiError::bad_request("enter a valid phone number"));
        }
    }
    if let Some(website) = website.as_deref() {
        if !(website.starts_with("http://") || website.starts_with("https://")) {
            return Err(ApiError::bad_request("enter a valid URL"));
        }
    }

    let fields = ProfileFields {
        username,
        email,
        first_name,
        last_name,
        phone_number,
        age,
        bio,
        image,
        website,
    };
    fields.validate()?;
    Ok(fields)
}

/// GET /user: the caller's own profile, as a one-element list.
pub async fn current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = claims.sub.to_string();
    let profile = blocking(&state, move |s| {
        let user = s.db.get_user_by_id(&uid)?.ok_or(ApiError::NotFound("user"))?;
        Ok(views::profile(&s.db, user)?)
    })
    .await?;

    Ok(Json(vec![profile]))
}

pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |s| Ok(s.db.get_user_by_id(&id.to_string())?))
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(views::account(&user)))
}

/// PUT /user/{id}: replace the caller's own profile fields.
pub async fn update_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): ApiJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if id != claims.sub {
        return Err(ApiError::Forbidden);
    }
    let fields = profile_fields(req)?;

    let user = blocking(&state, move |s| Ok(s.db.update_user(&id.to_string(), &fields)?)).await?;
    Ok(Json(views::account(&user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    if id != claims.sub {
        return Err(ApiError::Forbidden);
    }
    blocking(&state, move |s| Ok(s.db.delete_user(&id.to_string())?)).await?;
    info!(user = %claims.username, "Deleted account");
    Ok(StatusCode::NO_CONTENT)
}
