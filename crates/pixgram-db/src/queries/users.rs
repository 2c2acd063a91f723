use rusqlite::{OptionalExtension, Row, params};

use super::new_id;
use crate::models::{ProfileFields, UserRow};
use crate::{Database, DbError, Result};

const USER_COLUMNS: &str = "id, username, email, password, first_name, last_name, \
     phone_number, age, bio, image, website";

impl Database {
    // -- Users --

    pub fn create_user(&self, fields: &ProfileFields, password_hash: &str) -> Result<UserRow> {
        fields.validate()?;
        let id = new_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, first_name, last_name,
                                    phone_number, age, bio, image, website)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    id,
                    fields.username,
                    fields.email,
                    password_hash,
                    fields.first_name,
                    fields.last_name,
                    fields.phone_number,
                    fields.age,
                    fields.bio,
                    fields.image,
                    fields.website,
                ],
            )
            .map_err(|e| match DbError::from(e) {
                DbError::Conflict(_) => DbError::Conflict("username is already taken".into()),
                other => other,
            })?;
            query_user(conn, "id", &id)?.ok_or(DbError::NotFound("user"))
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn update_user(&self, id: &str, fields: &ProfileFields) -> Result<UserRow> {
        fields.validate()?;
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE users SET username = ?2, email = ?3, first_name = ?4, last_name = ?5,
                            phone_number = ?6, age = ?7, bio = ?8, image = ?9, website = ?10
                     WHERE id = ?1",
                    params![
                        id,
                        fields.username,
                        fields.email,
                        fields.first_name,
                        fields.last_name,
                        fields.phone_number,
                        fields.age,
                        fields.bio,
                        fields.image,
                        fields.website,
                    ],
                )
                .map_err(|e| match DbError::from(e) {
                    DbError::Conflict(_) => DbError::Conflict("username is already taken".into()),
                    other => other,
                })?;
            if changed == 0 {
                return Err(DbError::NotFound("user"));
            }
            query_user(conn, "id", id)?.ok_or(DbError::NotFound("user"))
        })
    }

    /// Removes the identity and, through cascading keys, everything it owns.
    pub fn delete_user(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            match conn.execute("DELETE FROM users WHERE id = ?1", [id])? {
                0 => Err(DbError::NotFound("user")),
                _ => Ok(()),
            }
        })
    }
}

fn query_user(conn: &rusqlite::Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let row = conn.query_row(&sql, [value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        first_name: row.get(4)?,
        last_name: row.get(5)?,
        phone_number: row.get(6)?,
        age: row.get(7)?,
        bio: row.get(8)?,
        image: row.get(9)?,
        website: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{db, user};

    #[test]
    fn duplicate_username_is_a_conflict() {
        let db = db();
        user(&db, "mira");
        let fields = ProfileFields {
            username: "mira".into(),
            ..Default::default()
        };
        assert!(matches!(
            db.create_user(&fields, "hash"),
            Err(DbError::Conflict(_))
        ));
    }

    #[test]
    fn update_replaces_profile_fields() {
        let db = db();
        let id = user(&db, "mira");
        let fields = ProfileFields {
            username: "mira".into(),
            bio: Some("photos of cats".into()),
            age: Some(30),
            website: Some("https://mira.example".into()),
            ..Default::default()
        };
        let row = db.update_user(&id, &fields).unwrap();
        assert_eq!(row.bio.as_deref(), Some("photos of cats"));
        assert_eq!(row.age, Some(30));
        assert_eq!(row.password, "hash");
    }

    #[test]
    fn out_of_range_age_is_rejected_on_update() {
        let db = db();
        let id = user(&db, "mira");
        let fields = ProfileFields {
            username: "mira".into(),
            age: Some(90),
            ..Default::default()
        };
        assert!(matches!(db.update_user(&id, &fields), Err(DbError::Invalid(_))));
    }

    #[test]
    fn delete_missing_user_is_not_found() {
        let db = db();
        assert!(matches!(db.delete_user("nope"), Err(DbError::NotFound(_))));
    }
}
