//! Response projections. Each entity has a list shape (minimal fields) and a
//! detail shape (full fields, nested counts and children). Detail timestamps
//! are day-month-year strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `strftime` pattern for detail-view timestamps.
pub const DETAIL_DATE_FORMAT: &str = "%d-%m-%Y";

/// The owning user of an entity, by handle only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserHandle {
    pub username: String,
}

// -- Users --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileView {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub age: Option<u8>,
    pub website: Option<String>,
    pub count_follower: u64,
    pub count_following: u64,
    pub count_post: u64,
    pub user_post: Vec<PostListView>,
}

/// Every stored attribute of an identity except its credential hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccountView {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<u8>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummaryView {
    pub id: Uuid,
    pub username: String,
    pub image: Option<String>,
    pub followed_at: DateTime<Utc>,
}

// -- Follows --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowView {
    pub id: Uuid,
    pub follower: Uuid,
    pub following: Uuid,
    pub created_at: DateTime<Utc>,
}

// -- Posts --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListView {
    pub id: Uuid,
    pub user: UserHandle,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailView {
    pub user: UserHandle,
    pub image: Option<String>,
    pub video: Option<String>,
    pub story_post: Vec<StoryListView>,
    pub post_like: Vec<PostLikeListView>,
    pub count_post_like: u64,
    pub description: Option<String>,
    pub count_comment: u64,
    pub comment_post: Vec<CommentListView>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostLikeListView {
    pub id: Uuid,
    pub like: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostLikeDetailView {
    pub user: UserHandle,
    pub like: bool,
    pub created_at: String,
}

// -- Comments --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentListView {
    pub id: Uuid,
    pub user: UserHandle,
    pub post: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDetailView {
    pub user: UserHandle,
    pub text: Option<String>,
    pub parent: Option<Uuid>,
    pub count_comment_like: u64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentLikeListView {
    pub id: Uuid,
    pub like: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentLikeDetailView {
    pub user: UserHandle,
    pub like: bool,
    pub created_at: String,
}

// -- Stories --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryListView {
    pub id: Uuid,
    pub user: UserHandle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryDetailView {
    pub user: UserHandle,
    pub image: Option<String>,
    pub video: Option<String>,
    pub created_at: String,
}

// -- Saved items --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveView {
    pub id: Uuid,
    pub user: UserHandle,
    pub save_item: Vec<SaveItemView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveItemView {
    pub id: Uuid,
    pub post: PostListView,
}

// -- Chats --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatView {
    pub id: Uuid,
    pub members: Vec<UserHandle>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub author: UserHandle,
    pub text: String,
    pub image: Option<String>,
    pub video: Option<String>,
    pub created_at: DateTime<Utc>,
}
