//! Database row types. These map directly to SQLite rows and stay
//! independent of the pixgram-types wire views.

use crate::{DbError, Result};

pub const MIN_AGE: u8 = 15;
pub const MAX_AGE: u8 = 85;

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub age: Option<u8>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub website: Option<String>,
}

/// Editable profile attributes of an identity. Writes replace every field.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub age: Option<u8>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub website: Option<String>,
}

impl ProfileFields {
    pub fn validate(&self) -> Result<()> {
        if let Some(age) = self.age {
            if !(MIN_AGE..=MAX_AGE).contains(&age) {
                return Err(DbError::Invalid(format!(
                    "age must be between {MIN_AGE} and {MAX_AGE}"
                )));
            }
        }
        Ok(())
    }
}

/// Media references carried by posts and stories.
#[derive(Debug, Clone, Default)]
pub struct Media {
    pub image: Option<String>,
    pub video: Option<String>,
}

impl Media {
    pub fn new(image: Option<String>, video: Option<String>) -> Self {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            image: present(image),
            video: present(video),
        }
    }

    /// Content must reference at least one of image or video.
    pub fn validate(&self) -> Result<()> {
        if self.image.is_none() && self.video.is_none() {
            return Err(DbError::Invalid(
                "choose at least one of image or video".into(),
            ));
        }
        Ok(())
    }
}

pub struct FollowRow {
    pub id: String,
    pub follower_id: String,
    pub following_id: String,
    pub created_at: String,
}

/// An identity reached through a follow edge.
pub struct FollowedUserRow {
    pub user_id: String,
    pub username: String,
    pub image: Option<String>,
    pub followed_at: String,
}

pub struct PostRow {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub image: Option<String>,
    pub video: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

pub struct StoryRow {
    pub id: String,
    pub username: String,
    pub image: Option<String>,
    pub video: Option<String>,
    pub created_at: String,
}

pub struct PostLikeRow {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub is_liked: bool,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: String,
    pub username: String,
    pub post_id: String,
    pub text: Option<String>,
    pub parent_id: Option<String>,
    pub created_at: String,
}

pub struct CommentLikeRow {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub is_liked: bool,
    pub created_at: String,
}

pub struct SaveRow {
    pub id: String,
    pub username: String,
}

pub struct SaveItemRow {
    pub id: String,
    /// The identity whose collection holds the item.
    pub owner_id: String,
    pub post_id: String,
    pub post_username: String,
    pub post_image: Option<String>,
}

pub struct ChatRow {
    pub id: String,
    pub created_at: String,
}

pub struct MemberRow {
    pub username: String,
}

pub struct MessageRow {
    pub id: String,
    pub chat_id: String,
    pub author_username: String,
    pub text: String,
    pub image: Option<String>,
    pub video: Option<String>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_media_is_rejected() {
        let media = Media::new(Some("   ".into()), None);
        assert!(media.image.is_none());
        assert!(matches!(media.validate(), Err(DbError::Invalid(_))));
    }

    #[test]
    fn either_media_kind_is_enough() {
        assert!(Media::new(Some("a.jpg".into()), None).validate().is_ok());
        assert!(Media::new(None, Some("a.mp4".into())).validate().is_ok());
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let mut fields = ProfileFields {
            username: "kat".into(),
            ..Default::default()
        };
        for (age, ok) in [(14, false), (15, true), (85, true), (86, false)] {
            fields.age = Some(age);
            assert_eq!(fields.validate().is_ok(), ok, "age {age}");
        }
    }
}
