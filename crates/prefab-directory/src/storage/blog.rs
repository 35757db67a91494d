use rusqlite::{params, Connection, OptionalExtension, Row};

use super::sqlite::{
    backend, classify, not_found_unless_changed, now_text, read_optional_timestamp,
    read_timestamp, timestamp_text, SqliteStore,
};
use super::StoreError;
use crate::accounts::UserId;
use crate::blog::{BlogPost, BlogRepository, PostFields, PostId};

const POST_COLUMNS: &str = "id, title, slug, content, excerpt, image_url, published, \
     published_at, author_id, created_at, updated_at";

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<BlogPost> {
    Ok(BlogPost {
        id: PostId(row.get("id")?),
        title: row.get("title")?,
        slug: row.get("slug")?,
        content: row.get("content")?,
        excerpt: row.get("excerpt")?,
        image_url: row.get("image_url")?,
        published: row.get("published")?,
        published_at: read_optional_timestamp(row, "published_at")?,
        author_id: row.get::<_, Option<i64>>("author_id")?.map(UserId),
        created_at: read_timestamp(row, "created_at")?,
        updated_at: read_timestamp(row, "updated_at")?,
    })
}

fn post_where(
    conn: &Connection,
    clause: &str,
    value: &dyn rusqlite::ToSql,
) -> Result<Option<BlogPost>, StoreError> {
    conn.query_row(
        &format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE {clause}"),
        [value],
        post_from_row,
    )
    .optional()
    .map_err(backend)
}

impl BlogRepository for SqliteStore {
    fn insert(&self, fields: &PostFields) -> Result<BlogPost, StoreError> {
        let conn = self.connection();
        conn.execute(
            "INSERT INTO blog_posts (title, slug, content, excerpt, image_url, published, \
             published_at, author_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                fields.title,
                fields.slug,
                fields.content,
                fields.excerpt,
                fields.image_url,
                fields.published,
                fields.published_at.map(timestamp_text),
                fields.author_id.map(|id| id.0),
                now_text(),
            ],
        )
        .map_err(|err| classify(err, "post", "user"))?;

        let id = conn.last_insert_rowid();
        post_where(&conn, "id = ?1", &id)?.ok_or(StoreError::NotFound { entity: "post" })
    }

    fn update(&self, id: PostId, fields: &PostFields) -> Result<BlogPost, StoreError> {
        let conn = self.connection();
        let changed = conn
            .execute(
                "UPDATE blog_posts SET title = ?2, slug = ?3, content = ?4, excerpt = ?5, \
                 image_url = ?6, published = ?7, published_at = ?8, author_id = ?9, \
                 updated_at = ?10 WHERE id = ?1",
                params![
                    id.0,
                    fields.title,
                    fields.slug,
                    fields.content,
                    fields.excerpt,
                    fields.image_url,
                    fields.published,
                    fields.published_at.map(timestamp_text),
                    fields.author_id.map(|id| id.0),
                    now_text(),
                ],
            )
            .map_err(|err| classify(err, "post", "user"))?;
        not_found_unless_changed(changed, "post")?;

        post_where(&conn, "id = ?1", &id.0)?.ok_or(StoreError::NotFound { entity: "post" })
    }

    fn delete(&self, id: PostId) -> Result<(), StoreError> {
        let changed = self
            .connection()
            .execute("DELETE FROM blog_posts WHERE id = ?1", [id.0])
            .map_err(backend)?;
        not_found_unless_changed(changed, "post")
    }

    fn fetch(&self, id: PostId) -> Result<Option<BlogPost>, StoreError> {
        post_where(&self.connection(), "id = ?1", &id.0)
    }

    fn fetch_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StoreError> {
        post_where(&self.connection(), "slug = ?1", &slug)
    }

    fn list(&self) -> Result<Vec<BlogPost>, StoreError> {
        let conn = self.connection();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {POST_COLUMNS} FROM blog_posts ORDER BY created_at DESC, id DESC"
            ))
            .map_err(backend)?;
        let rows = stmt.query_map([], post_from_row).map_err(backend)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(backend)
    }
}
