pub mod auth;
pub mod chats;
pub mod comments;
pub mod error;
pub mod follows;
pub mod likes;
pub mod middleware;
pub mod posts;
pub mod revocation;
pub mod saves;
pub mod stories;
pub mod tokens;
pub mod users;
pub mod views;


use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AppState, AppStateInner};
use crate::error::ApiError;
use crate::middleware::require_auth;

/// Run blocking store work off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(state.as_ref())).await?
}

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/token/refresh", post(auth::refresh))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/logout", post(auth::logout))
        .route("/user", get(users::current_user))
        .route(
            "/user/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/user/{id}/followers", get(follows::list_followers))
        .route("/user/{id}/following", get(follows::list_following))
        .route("/follows", get(follows::list_follows).post(follows::create_follow))
        .route("/follows/{id}", get(follows::get_follow).delete(follows::delete_follow))
        .route("/post_create", post(posts::create_post))
        .route("/post", get(posts::list_posts))
        .route("/post/{id}", get(posts::get_post))
        .route("/post_like", get(likes::list_post_likes))
        .route("/post_like/create", post(likes::create_post_like))
        .route("/post_like/{id}", get(likes::get_post_like).put(likes::update_post_like))
        .route("/comment", get(comments::list_comments))
        .route("/comment/create", post(comments::create_comment))
        .route("/comment/{id}", get(comments::get_comment))
        .route("/comment_like", get(likes::list_comment_likes))
        .route("/comment_like/create", post(likes::create_comment_like))
        .route(
            "/comment_like/{id}",
            get(likes::get_comment_like).put(likes::update_comment_like),
        )
        .route("/story", get(stories::list_stories))
        .route("/story/create", post(stories::create_story))
        .route("/story/{id}", get(stories::get_story))
        .route("/save", get(saves::get_save).post(saves::add_save_item))
        .route("/save/{id}", get(saves::get_save_item).delete(saves::delete_save_item))
        .route("/chats", get(chats::list_chats).post(chats::create_chat))
        .route(
            "/chats/{id}/messages",
            get(chats::get_messages).post(chats::send_message),
        )
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
