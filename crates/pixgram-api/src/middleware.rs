use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use pixgram_types::api::TokenType;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::tokens;

/// Validate the bearer access token and expose its claims to handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| ApiError::Unauthorized)?;

    let claims = tokens::verify(&state.auth.jwt_secret, bearer.token(), TokenType::Access)
        .map_err(|_| ApiError::Unauthorized)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
