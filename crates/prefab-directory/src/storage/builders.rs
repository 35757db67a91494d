use rusqlite::{params, Connection, OptionalExtension, Row};

use super::sqlite::{
    backend, classify, list_text, not_found_unless_changed, now_text, read_f32, read_label,
    read_list, read_timestamp, SqliteStore,
};
use super::StoreError;
use crate::builders::{
    BuilderFields, BuilderId, BuilderRepository, House, HouseBuilder, HouseFields, HouseId,
    HouseStatus,
};

const BUILDER_COLUMNS: &str =
    "id, name, slug, location, website, email, phone, description, created_at, updated_at";

const HOUSE_COLUMNS: &str = "id, builder_id, title, address, price, bedrooms, bathrooms, \
     square_feet, status, images, created_at, updated_at";

fn builder_from_row(row: &Row<'_>) -> rusqlite::Result<HouseBuilder> {
    Ok(HouseBuilder {
        id: BuilderId(row.get("id")?),
        name: row.get("name")?,
        slug: row.get("slug")?,
        location: row.get("location")?,
        website: row.get("website")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        description: row.get("description")?,
        created_at: read_timestamp(row, "created_at")?,
        updated_at: read_timestamp(row, "updated_at")?,
    })
}

fn house_from_row(row: &Row<'_>) -> rusqlite::Result<House> {
    let price: i64 = row.get("price")?;
    Ok(House {
        id: HouseId(row.get("id")?),
        builder_id: BuilderId(row.get("builder_id")?),
        title: row.get("title")?,
        address: row.get("address")?,
        price: u64::try_from(price).unwrap_or_default(),
        bedrooms: row.get("bedrooms")?,
        bathrooms: read_f32(row, "bathrooms")?,
        square_feet: row.get("square_feet")?,
        status: read_label(row, "status", HouseStatus::from_label)?,
        images: read_list(row, "images")?,
        created_at: read_timestamp(row, "created_at")?,
        updated_at: read_timestamp(row, "updated_at")?,
    })
}

fn builder_by_id(conn: &Connection, id: i64) -> Result<Option<HouseBuilder>, StoreError> {
    conn.query_row(
        &format!("SELECT {BUILDER_COLUMNS} FROM builders WHERE id = ?1"),
        [id],
        builder_from_row,
    )
    .optional()
    .map_err(backend)
}

fn house_by_id(conn: &Connection, id: i64) -> Result<Option<House>, StoreError> {
    conn.query_row(
        &format!("SELECT {HOUSE_COLUMNS} FROM houses WHERE id = ?1"),
        [id],
        house_from_row,
    )
    .optional()
    .map_err(backend)
}

fn price_column(price: u64) -> i64 {
    i64::try_from(price).unwrap_or(i64::MAX)
}

impl BuilderRepository for SqliteStore {
    fn insert_builder(&self, fields: &BuilderFields) -> Result<HouseBuilder, StoreError> {
        let conn = self.connection();
        conn.execute(
            "INSERT INTO builders (name, slug, location, website, email, phone, description, \
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                fields.name,
                fields.slug,
                fields.location,
                fields.website,
                fields.email,
                fields.phone,
                fields.description,
                now_text(),
            ],
        )
        .map_err(|err| classify(err, "builder", "builder"))?;

        builder_by_id(&conn, conn.last_insert_rowid())?
            .ok_or(StoreError::NotFound { entity: "builder" })
    }

    fn update_builder(
        &self,
        id: BuilderId,
        fields: &BuilderFields,
    ) -> Result<HouseBuilder, StoreError> {
        let conn = self.connection();
        let changed = conn
            .execute(
                "UPDATE builders SET name = ?2, slug = ?3, location = ?4, website = ?5, \
                 email = ?6, phone = ?7, description = ?8, updated_at = ?9 WHERE id = ?1",
                params![
                    id.0,
                    fields.name,
                    fields.slug,
                    fields.location,
                    fields.website,
                    fields.email,
                    fields.phone,
                    fields.description,
                    now_text(),
                ],
            )
            .map_err(|err| classify(err, "builder", "builder"))?;
        not_found_unless_changed(changed, "builder")?;

        builder_by_id(&conn, id.0)?.ok_or(StoreError::NotFound { entity: "builder" })
    }

    fn delete_builder(&self, id: BuilderId) -> Result<(), StoreError> {
        let changed = self
            .connection()
            .execute("DELETE FROM builders WHERE id = ?1", [id.0])
            .map_err(backend)?;
        not_found_unless_changed(changed, "builder")
    }

    fn fetch_builder(&self, id: BuilderId) -> Result<Option<HouseBuilder>, StoreError> {
        builder_by_id(&self.connection(), id.0)
    }

    fn list_builders(&self) -> Result<Vec<HouseBuilder>, StoreError> {
        let conn = self.connection();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {BUILDER_COLUMNS} FROM builders ORDER BY name COLLATE NOCASE, id"
            ))
            .map_err(backend)?;
        let rows = stmt.query_map([], builder_from_row).map_err(backend)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(backend)
    }

    fn insert_house(&self, fields: &HouseFields) -> Result<House, StoreError> {
        let conn = self.connection();
        conn.execute(
            "INSERT INTO houses (builder_id, title, address, price, bedrooms, bathrooms, \
             square_feet, status, images, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                fields.builder_id.0,
                fields.title,
                fields.address,
                price_column(fields.price),
                fields.bedrooms,
                fields.bathrooms.map(f64::from),
                fields.square_feet,
                fields.status.label(),
                list_text(&fields.images),
                now_text(),
            ],
        )
        .map_err(|err| classify(err, "house", "builder"))?;

        house_by_id(&conn, conn.last_insert_rowid())?
            .ok_or(StoreError::NotFound { entity: "house" })
    }

    fn update_house(&self, id: HouseId, fields: &HouseFields) -> Result<House, StoreError> {
        let conn = self.connection();
        let changed = conn
            .execute(
                "UPDATE houses SET builder_id = ?2, title = ?3, address = ?4, price = ?5, \
                 bedrooms = ?6, bathrooms = ?7, square_feet = ?8, status = ?9, images = ?10, \
                 updated_at = ?11 WHERE id = ?1",
                params![
                    id.0,
                    fields.builder_id.0,
                    fields.title,
                    fields.address,
                    price_column(fields.price),
                    fields.bedrooms,
                    fields.bathrooms.map(f64::from),
                    fields.square_feet,
                    fields.status.label(),
                    list_text(&fields.images),
                    now_text(),
                ],
            )
            .map_err(|err| classify(err, "house", "builder"))?;
        not_found_unless_changed(changed, "house")?;

        house_by_id(&conn, id.0)?.ok_or(StoreError::NotFound { entity: "house" })
    }

    fn delete_house(&self, id: HouseId) -> Result<(), StoreError> {
        let changed = self
            .connection()
            .execute("DELETE FROM houses WHERE id = ?1", [id.0])
            .map_err(backend)?;
        not_found_unless_changed(changed, "house")
    }

    fn fetch_house(&self, id: HouseId) -> Result<Option<House>, StoreError> {
        house_by_id(&self.connection(), id.0)
    }

    fn list_houses(&self, builder: Option<BuilderId>) -> Result<Vec<House>, StoreError> {
        let conn = self.connection();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {HOUSE_COLUMNS} FROM houses WHERE (?1 IS NULL OR builder_id = ?1) \
                 ORDER BY created_at DESC, id DESC"
            ))
            .map_err(backend)?;
        let rows = stmt
            .query_map([builder.map(|id| id.0)], house_from_row)
            .map_err(backend)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(backend)
    }
}
