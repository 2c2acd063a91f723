use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims for both halves of a token pair. `jti` identifies the token in
/// the revocation store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
    pub jti: Uuid,
    pub token_type: TokenType,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub age: Option<u8>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub website: Option<String>,
}

impl RegisterRequest {
    /// Splits off the plaintext password from the profile fields.
    pub fn into_parts(self) -> (String, ProfileInput) {
        let profile = ProfileInput {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            phone_number: self.phone_number,
            bio: self.bio,
            image: self.image,
            website: self.website,
        };
        (self.password, profile)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginUser {
    pub username: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh: Option<String>,
}

// -- Users --

/// An identity's editable profile fields, as sent by clients.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileInput {
    pub username: String,
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub age: Option<u8>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub website: Option<String>,
}

/// Full replacement of an identity's profile fields.
pub type UpdateUserRequest = ProfileInput;

// -- Follows --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateFollowRequest {
    pub following: Uuid,
}

// -- Content --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub image: Option<String>,
    pub video: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateStoryRequest {
    pub image: Option<String>,
    pub video: Option<String>,
}

// -- Engagement --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostLikeRequest {
    pub post: Uuid,
    #[serde(default)]
    pub like: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentLikeRequest {
    pub comment: Uuid,
    #[serde(default)]
    pub like: bool,
}

/// Flips an existing like row in place.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateLikeRequest {
    pub like: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub post: Uuid,
    pub text: Option<String>,
    pub parent: Option<Uuid>,
}

// -- Saved items --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddSaveItemRequest {
    pub post_id: Uuid,
}

// -- Chats --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChatRequest {
    /// Other participants; the caller is always added.
    pub members: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub text: String,
    pub image: Option<String>,
    pub video: Option<String>,
}
