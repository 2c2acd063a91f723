//! Row-to-view projection. Plain conversions take a row; the `*_detail` and
//! `profile` builders also query the aggregation layer.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use pixgram_db::models::{
    ChatRow, CommentLikeRow, CommentRow, FollowRow, FollowedUserRow, MemberRow, MessageRow,
    PostLikeRow, PostRow, SaveItemRow, SaveRow, StoryRow, UserRow,
};
use pixgram_db::{Database, Result};
use pixgram_types::views::{
    ChatView, CommentDetailView, CommentLikeDetailView, CommentLikeListView, CommentListView,
    DETAIL_DATE_FORMAT, FollowView, MessageView, PostDetailView, PostLikeDetailView,
    PostLikeListView, PostListView, SaveItemView, SaveView, StoryDetailView, StoryListView,
    UserAccountView, UserHandle, UserProfileView, UserSummaryView,
};

/// Parse a stored id, logging instead of failing on corrupt rows.
pub fn parse_id(raw: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt id '{}': {}", raw, e);
        Uuid::default()
    })
}

pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

pub fn detail_date(raw: &str) -> String {
    parse_timestamp(raw).format(DETAIL_DATE_FORMAT).to_string()
}

fn handle(username: &str) -> UserHandle {
    UserHandle {
        username: username.to_string(),
    }
}

// -- Users --

pub fn account(user: &UserRow) -> UserAccountView {
    UserAccountView {
        id: parse_id(&user.id),
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        age: user.age,
        phone_number: user.phone_number.clone(),
        bio: user.bio.clone(),
        image: user.image.clone(),
        website: user.website.clone(),
    }
}

pub fn profile(db: &Database, user: UserRow) -> Result<UserProfileView> {
    let posts = db.list_posts_by_user(&user.id)?;
    Ok(UserProfileView {
        id: parse_id(&user.id),
        count_follower: db.count_followers(&user.id)?,
        count_following: db.count_following(&user.id)?,
        count_post: db.count_posts(&user.id)?,
        user_post: posts.iter().map(post_list).collect(),
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        image: user.image,
        bio: user.bio,
        age: user.age,
        website: user.website,
    })
}

pub fn summary(row: &FollowedUserRow) -> UserSummaryView {
    UserSummaryView {
        id: parse_id(&row.user_id),
        username: row.username.clone(),
        image: row.image.clone(),
        followed_at: parse_timestamp(&row.followed_at),
    }
}

// -- Follows --

pub fn follow(row: &FollowRow) -> FollowView {
    FollowView {
        id: parse_id(&row.id),
        follower: parse_id(&row.follower_id),
        following: parse_id(&row.following_id),
        created_at: parse_timestamp(&row.created_at),
    }
}

// -- Posts --

pub fn post_list(row: &PostRow) -> PostListView {
    PostListView {
        id: parse_id(&row.id),
        user: handle(&row.username),
        image: row.image.clone(),
    }
}

/// The post with its likes, comments, and the author's stories.
pub fn post_detail(db: &Database, row: PostRow) -> Result<PostDetailView> {
    let stories = db.list_stories_by_user(&row.user_id)?;
    let likes = db.list_post_likes_for_post(&row.id)?;
    let comments = db.list_comments_for_post(&row.id)?;

    Ok(PostDetailView {
        user: handle(&row.username),
        story_post: stories.iter().map(story_list).collect(),
        post_like: likes.iter().map(post_like_list).collect(),
        count_post_like: db.count_post_likes(&row.id)?,
        count_comment: db.count_comments(&row.id)?,
        comment_post: comments.iter().map(comment_list).collect(),
        created_at: detail_date(&row.created_at),
        image: row.image,
        video: row.video,
        description: row.description,
    })
}

pub fn post_like_list(row: &PostLikeRow) -> PostLikeListView {
    PostLikeListView {
        id: parse_id(&row.id),
        like: row.is_liked,
    }
}

pub fn post_like_detail(row: &PostLikeRow) -> PostLikeDetailView {
    PostLikeDetailView {
        user: handle(&row.username),
        like: row.is_liked,
        created_at: detail_date(&row.created_at),
    }
}

// -- Comments --

pub fn comment_list(row: &CommentRow) -> CommentListView {
    CommentListView {
        id: parse_id(&row.id),
        user: handle(&row.username),
        post: parse_id(&row.post_id),
    }
}

pub fn comment_detail(db: &Database, row: CommentRow) -> Result<CommentDetailView> {
    Ok(CommentDetailView {
        user: handle(&row.username),
        parent: row.parent_id.as_deref().map(parse_id),
        count_comment_like: db.count_comment_likes(&row.id)?,
        created_at: detail_date(&row.created_at),
        text: row.text,
    })
}

pub fn comment_like_list(row: &CommentLikeRow) -> CommentLikeListView {
    CommentLikeListView {
        id: parse_id(&row.id),
        like: row.is_liked,
    }
}

pub fn comment_like_detail(row: &CommentLikeRow) -> CommentLikeDetailView {
    CommentLikeDetailView {
        user: handle(&row.username),
        like: row.is_liked,
        created_at: detail_date(&row.created_at),
    }
}

// -- Stories --

pub fn story_list(row: &StoryRow) -> StoryListView {
    StoryListView {
        id: parse_id(&row.id),
        user: handle(&row.username),
    }
}

pub fn story_detail(row: &StoryRow) -> StoryDetailView {
    StoryDetailView {
        user: handle(&row.username),
        image: row.image.clone(),
        video: row.video.clone(),
        created_at: detail_date(&row.created_at),
    }
}

// -- Saved items --

pub fn save(save: &SaveRow, items: &[SaveItemRow]) -> SaveView {
    SaveView {
        id: parse_id(&save.id),
        user: handle(&save.username),
        save_item: items.iter().map(save_item).collect(),
    }
}

pub fn save_item(row: &SaveItemRow) -> SaveItemView {
    SaveItemView {
        id: parse_id(&row.id),
        post: PostListView {
            id: parse_id(&row.post_id),
            user: handle(&row.post_username),
            image: row.post_image.clone(),
        },
    }
}

// -- Chats --

pub fn chat(row: &ChatRow, members: &[MemberRow]) -> ChatView {
    ChatView {
        id: parse_id(&row.id),
        members: members.iter().map(|m| handle(&m.username)).collect(),
        created_at: parse_timestamp(&row.created_at),
    }
}

pub fn message(row: MessageRow) -> MessageView {
    MessageView {
        id: parse_id(&row.id),
        chat_id: parse_id(&row.chat_id),
        author: handle(&row.author_username),
        created_at: parse_timestamp(&row.created_at),
        text: row.text,
        image: row.image,
        video: row.video,
    }
}
