use rusqlite::{params, Connection, OptionalExtension, Row};

use super::sqlite::{backend, classify, now_text, read_label, read_timestamp, SqliteStore};
use super::StoreError;
use crate::accounts::{NewUser, Role, User, UserChanges, UserId, UserRepository};

const USER_COLUMNS: &str = "id, email, name, password_hash, role, created_at";

/// True when the row is not an admin or another admin remains. Evaluated inside the write
/// statement so the check and the change cannot interleave with a concurrent demotion.
const KEEPS_AN_ADMIN: &str = "(role <> 'admin' \
     OR (SELECT COUNT(*) FROM users WHERE role = 'admin') > 1)";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get("id")?),
        email: row.get("email")?,
        name: row.get("name")?,
        password_hash: row.get("password_hash")?,
        role: read_label(row, "role", Role::from_label)?,
        created_at: read_timestamp(row, "created_at")?,
    })
}

fn user_where(
    conn: &Connection,
    clause: &str,
    value: &dyn rusqlite::ToSql,
) -> Result<Option<User>, StoreError> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}"),
        [value],
        user_from_row,
    )
    .optional()
    .map_err(backend)
}

/// Explains a guarded write that touched no rows.
fn missing_or_last_admin(conn: &Connection, id: UserId) -> StoreError {
    match user_where(conn, "id = ?1", &id.0) {
        Ok(Some(_)) => StoreError::LastAdmin,
        Ok(None) => StoreError::NotFound { entity: "user" },
        Err(err) => err,
    }
}

impl UserRepository for SqliteStore {
    fn insert(&self, user: &NewUser) -> Result<User, StoreError> {
        let conn = self.connection();
        conn.execute(
            "INSERT INTO users (email, name, password_hash, role, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.email.to_lowercase(),
                user.name,
                user.password_hash,
                user.role.label(),
                now_text(),
            ],
        )
        .map_err(|err| classify(err, "user", "user"))?;

        let id = conn.last_insert_rowid();
        user_where(&conn, "id = ?1", &id)?.ok_or(StoreError::NotFound { entity: "user" })
    }

    fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, StoreError> {
        let conn = self.connection();
        let changed = conn
            .execute(
                &format!(
                    "UPDATE users SET name = ?2, role = ?3, \
                     password_hash = COALESCE(?4, password_hash) \
                     WHERE id = ?1 AND (?3 = 'admin' OR {KEEPS_AN_ADMIN})"
                ),
                params![id.0, changes.name, changes.role.label(), changes.password_hash],
            )
            .map_err(|err| classify(err, "user", "user"))?;
        if changed == 0 {
            return Err(missing_or_last_admin(&conn, id));
        }

        user_where(&conn, "id = ?1", &id.0)?.ok_or(StoreError::NotFound { entity: "user" })
    }

    fn delete(&self, id: UserId) -> Result<(), StoreError> {
        let conn = self.connection();
        let changed = conn
            .execute(
                &format!("DELETE FROM users WHERE id = ?1 AND {KEEPS_AN_ADMIN}"),
                [id.0],
            )
            .map_err(backend)?;
        if changed == 0 {
            return Err(missing_or_last_admin(&conn, id));
        }
        Ok(())
    }

    fn fetch(&self, id: UserId) -> Result<Option<User>, StoreError> {
        user_where(&self.connection(), "id = ?1", &id.0)
    }

    fn fetch_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        user_where(&self.connection(), "email = ?1", &email.trim().to_lowercase())
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        let conn = self.connection();
        let mut stmt = conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY email"))
            .map_err(backend)?;
        let rows = stmt.query_map([], user_from_row).map_err(backend)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(backend)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .connection()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(backend)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "Jordan".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role: Role::Editor,
        }
    }

    #[test]
    fn emails_are_unique_regardless_of_case() {
        let store = SqliteStore::open_in_memory().expect("store");
        store.insert(&new_user("jordan@example.com")).expect("insert");
        let err = store
            .insert(&new_user("Jordan@Example.com"))
            .expect_err("duplicate");
        assert_eq!(
            err,
            StoreError::Conflict {
                entity: "user",
                field: "email".to_string()
            }
        );
        assert!(store
            .fetch_by_email(" JORDAN@example.com ")
            .expect("lookup")
            .is_some());
    }

    #[test]
    fn update_keeps_hash_when_password_unchanged() {
        let store = SqliteStore::open_in_memory().expect("store");
        let user = store.insert(&new_user("sam@example.com")).expect("insert");
        let updated = store
            .update(
                user.id,
                &UserChanges {
                    name: "Sam".to_string(),
                    role: Role::Admin,
                    password_hash: None,
                },
            )
            .expect("update");
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.password_hash, user.password_hash);
        assert_eq!(store.count().expect("count"), 1);
    }

    fn admin(store: &SqliteStore, email: &str) -> User {
        store
            .insert(&NewUser {
                role: Role::Admin,
                ..new_user(email)
            })
            .expect("admin")
    }

    fn demote(store: &SqliteStore, user: &User) -> Result<User, StoreError> {
        store.update(
            user.id,
            &UserChanges {
                name: user.name.clone(),
                role: Role::Editor,
                password_hash: None,
            },
        )
    }

    #[test]
    fn last_admin_cannot_be_demoted_or_deleted() {
        let store = SqliteStore::open_in_memory().expect("store");
        let first = admin(&store, "first@example.com");
        let second = admin(&store, "second@example.com");

        demote(&store, &first).expect("another admin remains");
        assert_eq!(demote(&store, &second), Err(StoreError::LastAdmin));
        assert_eq!(store.delete(second.id), Err(StoreError::LastAdmin));

        store.delete(first.id).expect("editors can be deleted");
        assert_eq!(
            store.delete(first.id),
            Err(StoreError::NotFound { entity: "user" })
        );
        assert_eq!(
            demote(&store, &first),
            Err(StoreError::NotFound { entity: "user" })
        );
    }
}
