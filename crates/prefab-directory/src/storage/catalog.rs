use rusqlite::{params, Connection, OptionalExtension, Row};

use super::sqlite::{
    backend, classify, list_text, not_found_unless_changed, now_text, read_f32, read_list,
    read_timestamp, SqliteStore,
};
use super::StoreError;
use crate::catalog::{
    Coordinates, HomeModel, Manufacturer, ManufacturerFields, ManufacturerId,
    ManufacturerRepository, ModelFields, ModelId, ModelRepository,
};

const MANUFACTURER_COLUMNS: &str = "id, name, slug, location, state, latitude, longitude, \
     description, logo_url, website, email, phone, published, created_at, updated_at";

const MODEL_COLUMNS: &str = "id, manufacturer_id, name, slug, description, square_feet, \
     bedrooms, bathrooms, price_range, category, tags, features, images, published, \
     created_at, updated_at";

fn manufacturer_from_row(row: &Row<'_>) -> rusqlite::Result<Manufacturer> {
    let latitude: Option<f64> = row.get("latitude")?;
    let longitude: Option<f64> = row.get("longitude")?;
    let coordinates = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    Ok(Manufacturer {
        id: ManufacturerId(row.get("id")?),
        name: row.get("name")?,
        slug: row.get("slug")?,
        location: row.get("location")?,
        state: row.get("state")?,
        coordinates,
        description: row.get("description")?,
        logo_url: row.get("logo_url")?,
        website: row.get("website")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        published: row.get("published")?,
        created_at: read_timestamp(row, "created_at")?,
        updated_at: read_timestamp(row, "updated_at")?,
    })
}

fn model_from_row(row: &Row<'_>) -> rusqlite::Result<HomeModel> {
    Ok(HomeModel {
        id: ModelId(row.get("id")?),
        manufacturer_id: ManufacturerId(row.get("manufacturer_id")?),
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        square_feet: row.get("square_feet")?,
        bedrooms: row.get("bedrooms")?,
        bathrooms: read_f32(row, "bathrooms")?,
        price_range: row.get("price_range")?,
        category: row.get("category")?,
        tags: read_list(row, "tags")?,
        features: read_list(row, "features")?,
        images: read_list(row, "images")?,
        published: row.get("published")?,
        created_at: read_timestamp(row, "created_at")?,
        updated_at: read_timestamp(row, "updated_at")?,
    })
}

fn manufacturer_where(
    conn: &Connection,
    clause: &str,
    value: &dyn rusqlite::ToSql,
) -> Result<Option<Manufacturer>, StoreError> {
    conn.query_row(
        &format!("SELECT {MANUFACTURER_COLUMNS} FROM manufacturers WHERE {clause}"),
        [value],
        manufacturer_from_row,
    )
    .optional()
    .map_err(backend)
}

fn model_where(
    conn: &Connection,
    clause: &str,
    value: &dyn rusqlite::ToSql,
) -> Result<Option<HomeModel>, StoreError> {
    conn.query_row(
        &format!("SELECT {MODEL_COLUMNS} FROM models WHERE {clause}"),
        [value],
        model_from_row,
    )
    .optional()
    .map_err(backend)
}

fn models_query(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<HomeModel>, StoreError> {
    let mut stmt = conn.prepare(sql).map_err(backend)?;
    let rows = stmt.query_map(params, model_from_row).map_err(backend)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(backend)
}

impl ManufacturerRepository for SqliteStore {
    fn insert(&self, fields: &ManufacturerFields) -> Result<Manufacturer, StoreError> {
        let conn = self.connection();
        let now = now_text();
        conn.execute(
            "INSERT INTO manufacturers (name, slug, location, state, latitude, longitude, \
             description, logo_url, website, email, phone, published, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
            params![
                fields.name,
                fields.slug,
                fields.location,
                fields.state,
                fields.coordinates.map(|c| c.latitude),
                fields.coordinates.map(|c| c.longitude),
                fields.description,
                fields.logo_url,
                fields.website,
                fields.email,
                fields.phone,
                fields.published,
                now,
            ],
        )
        .map_err(|err| classify(err, "manufacturer", "manufacturer"))?;

        let id = conn.last_insert_rowid();
        manufacturer_where(&conn, "id = ?1", &id)?.ok_or(StoreError::NotFound {
            entity: "manufacturer",
        })
    }

    fn update(
        &self,
        id: ManufacturerId,
        fields: &ManufacturerFields,
    ) -> Result<Manufacturer, StoreError> {
        let conn = self.connection();
        let changed = conn
            .execute(
                "UPDATE manufacturers SET name = ?2, slug = ?3, location = ?4, state = ?5, \
                 latitude = ?6, longitude = ?7, description = ?8, logo_url = ?9, website = ?10, \
                 email = ?11, phone = ?12, published = ?13, updated_at = ?14 WHERE id = ?1",
                params![
                    id.0,
                    fields.name,
                    fields.slug,
                    fields.location,
                    fields.state,
                    fields.coordinates.map(|c| c.latitude),
                    fields.coordinates.map(|c| c.longitude),
                    fields.description,
                    fields.logo_url,
                    fields.website,
                    fields.email,
                    fields.phone,
                    fields.published,
                    now_text(),
                ],
            )
            .map_err(|err| classify(err, "manufacturer", "manufacturer"))?;
        not_found_unless_changed(changed, "manufacturer")?;

        manufacturer_where(&conn, "id = ?1", &id.0)?.ok_or(StoreError::NotFound {
            entity: "manufacturer",
        })
    }

    fn delete(&self, id: ManufacturerId) -> Result<(), StoreError> {
        let changed = self
            .connection()
            .execute("DELETE FROM manufacturers WHERE id = ?1", [id.0])
            .map_err(backend)?;
        not_found_unless_changed(changed, "manufacturer")
    }

    fn fetch(&self, id: ManufacturerId) -> Result<Option<Manufacturer>, StoreError> {
        manufacturer_where(&self.connection(), "id = ?1", &id.0)
    }

    fn fetch_by_slug(&self, slug: &str) -> Result<Option<Manufacturer>, StoreError> {
        manufacturer_where(&self.connection(), "slug = ?1", &slug)
    }

    fn list(&self) -> Result<Vec<Manufacturer>, StoreError> {
        let conn = self.connection();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {MANUFACTURER_COLUMNS} FROM manufacturers ORDER BY name COLLATE NOCASE, id"
            ))
            .map_err(backend)?;
        let rows = stmt
            .query_map([], manufacturer_from_row)
            .map_err(backend)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(backend)
    }
}

impl ModelRepository for SqliteStore {
    fn insert(&self, fields: &ModelFields) -> Result<HomeModel, StoreError> {
        let conn = self.connection();
        conn.execute(
            "INSERT INTO models (manufacturer_id, name, slug, description, square_feet, bedrooms, \
             bathrooms, price_range, category, tags, features, images, published, created_at, \
             updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
            params![
                fields.manufacturer_id.0,
                fields.name,
                fields.slug,
                fields.description,
                fields.square_feet,
                fields.bedrooms,
                fields.bathrooms.map(f64::from),
                fields.price_range,
                fields.category,
                list_text(&fields.tags),
                list_text(&fields.features),
                list_text(&fields.images),
                fields.published,
                now_text(),
            ],
        )
        .map_err(|err| classify(err, "model", "manufacturer"))?;

        let id = conn.last_insert_rowid();
        model_where(&conn, "id = ?1", &id)?.ok_or(StoreError::NotFound { entity: "model" })
    }

    fn update(&self, id: ModelId, fields: &ModelFields) -> Result<HomeModel, StoreError> {
        let conn = self.connection();
        let changed = conn
            .execute(
                "UPDATE models SET manufacturer_id = ?2, name = ?3, slug = ?4, description = ?5, \
                 square_feet = ?6, bedrooms = ?7, bathrooms = ?8, price_range = ?9, \
                 category = ?10, tags = ?11, features = ?12, images = ?13, published = ?14, \
                 updated_at = ?15 WHERE id = ?1",
                params![
                    id.0,
                    fields.manufacturer_id.0,
                    fields.name,
                    fields.slug,
                    fields.description,
                    fields.square_feet,
                    fields.bedrooms,
                    fields.bathrooms.map(f64::from),
                    fields.price_range,
                    fields.category,
                    list_text(&fields.tags),
                    list_text(&fields.features),
                    list_text(&fields.images),
                    fields.published,
                    now_text(),
                ],
            )
            .map_err(|err| classify(err, "model", "manufacturer"))?;
        not_found_unless_changed(changed, "model")?;

        model_where(&conn, "id = ?1", &id.0)?.ok_or(StoreError::NotFound { entity: "model" })
    }

    fn delete(&self, id: ModelId) -> Result<(), StoreError> {
        let changed = self
            .connection()
            .execute("DELETE FROM models WHERE id = ?1", [id.0])
            .map_err(backend)?;
        not_found_unless_changed(changed, "model")
    }

    fn fetch(&self, id: ModelId) -> Result<Option<HomeModel>, StoreError> {
        model_where(&self.connection(), "id = ?1", &id.0)
    }

    fn fetch_by_slug(&self, slug: &str) -> Result<Option<HomeModel>, StoreError> {
        model_where(&self.connection(), "slug = ?1", &slug)
    }

    fn list(&self) -> Result<Vec<HomeModel>, StoreError> {
        models_query(
            &self.connection(),
            &format!("SELECT {MODEL_COLUMNS} FROM models ORDER BY name COLLATE NOCASE, id"),
            &[],
        )
    }

    fn list_for_manufacturer(&self, id: ManufacturerId) -> Result<Vec<HomeModel>, StoreError> {
        models_query(
            &self.connection(),
            &format!(
                "SELECT {MODEL_COLUMNS} FROM models WHERE manufacturer_id = ?1 \
                 ORDER BY name COLLATE NOCASE, id"
            ),
            &[&id.0],
        )
    }
}
