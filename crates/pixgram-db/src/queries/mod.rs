mod chats;
mod content;
mod engagement;
mod follows;
mod revocations;
mod saves;
mod users;

pub use follows::{FollowFilter, FollowOrdering};
pub use content::PostFilter;

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::Database;
    use crate::models::{Media, PostRow, ProfileFields};

    pub fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    pub fn user(db: &Database, username: &str) -> String {
        let fields = ProfileFields {
            username: username.into(),
            ..Default::default()
        };
        db.create_user(&fields, "hash").unwrap().id
    }

    pub fn post(db: &Database, user_id: &str) -> PostRow {
        db.create_post(user_id, &Media::new(Some("p.jpg".into()), None), None)
            .unwrap()
    }
}
