use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{ffi, Connection, ErrorCode, Row};

use super::schema::SCHEMA;
use super::StoreError;

/// Single-connection SQLite store implementing every repository trait.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file and applies the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| StoreError::Backend(err.to_string()))?;
        }

        let conn = Connection::open(path).map_err(backend)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .map_err(backend)?;
        Self::initialize(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        Self::initialize(conn)
    }

    /// Opens `":memory:"` as an in-memory store and anything else as a file path.
    pub fn open_location(location: &str) -> Result<Self, StoreError> {
        if location == ":memory:" {
            Self::open_in_memory()
        } else {
            Self::open(location)
        }
    }

    fn initialize(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(backend)?;
        conn.execute_batch(SCHEMA).map_err(backend)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(super) fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("sqlite mutex poisoned")
    }

    /// Cheap round trip used by the readiness probe.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.connection()
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(backend)
    }
}

pub(super) fn backend(err: rusqlite::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Maps constraint failures to typed errors. `entity` names the table being written and
/// `reference` the parent a foreign key points at.
pub(super) fn classify(
    err: rusqlite::Error,
    entity: &'static str,
    reference: &'static str,
) -> StoreError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return StoreError::Conflict {
                        entity,
                        field: conflicting_column(message.as_deref()),
                    };
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return StoreError::MissingReference { entity: reference };
                }
                _ => {}
            }
        }
    }
    backend(err)
}

/// `UNIQUE constraint failed: manufacturers.slug` yields `slug`.
fn conflicting_column(message: Option<&str>) -> String {
    message
        .and_then(|message| message.rsplit(['.', ' ']).next())
        .filter(|column| !column.is_empty())
        .unwrap_or("value")
        .to_string()
}

pub(super) fn not_found_unless_changed(
    changed: usize,
    entity: &'static str,
) -> Result<(), StoreError> {
    if changed == 0 {
        Err(StoreError::NotFound { entity })
    } else {
        Ok(())
    }
}

pub(super) fn now_text() -> String {
    timestamp_text(Utc::now())
}

pub(super) fn timestamp_text(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(super) fn read_timestamp(row: &Row<'_>, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(column)?;
    parse_timestamp(&text, column)
}

pub(super) fn read_optional_timestamp(
    row: &Row<'_>,
    column: &str,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(column)?;
    text.map(|text| parse_timestamp(&text, column)).transpose()
}

fn parse_timestamp(text: &str, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| decode_failure(column, err))
}

pub(super) fn list_text(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

pub(super) fn read_list(row: &Row<'_>, column: &str) -> rusqlite::Result<Vec<String>> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text).map_err(|err| decode_failure(column, err))
}

pub(super) fn read_json(
    row: &Row<'_>,
    column: &str,
) -> rusqlite::Result<Option<serde_json::Value>> {
    let text: Option<String> = row.get(column)?;
    text.map(|text| serde_json::from_str(&text).map_err(|err| decode_failure(column, err)))
        .transpose()
}

pub(super) fn read_label<T>(
    row: &Row<'_>,
    column: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let text: String = row.get(column)?;
    parse(&text).ok_or_else(|| decode_failure(column, format!("unknown value '{text}'")))
}

pub(super) fn read_f32(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<f32>> {
    let value: Option<f64> = row.get(column)?;
    Ok(value.map(|value| value as f32))
}

fn decode_failure(
    column: &str,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    let err = err.into();
    rusqlite::Error::FromSqlConversionFailure(
        0,
        Type::Text,
        format!("column {column}: {err}").into(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_column_from_unique_message() {
        assert_eq!(
            conflicting_column(Some("UNIQUE constraint failed: manufacturers.slug")),
            "slug"
        );
        assert_eq!(conflicting_column(None), "value");
    }

    #[test]
    fn timestamps_round_trip_with_fixed_width() {
        let now = Utc::now();
        let text = timestamp_text(now);
        assert!(text.ends_with('Z'));
        assert_eq!(text.len(), "2025-01-01T00:00:00.000000Z".len());
        let parsed = parse_timestamp(&text, "created_at").expect("parse");
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn in_memory_store_answers_ping() {
        let store = SqliteStore::open_in_memory().expect("store");
        store.ping().expect("ping");
    }

    #[test]
    fn file_store_creates_parent_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("prefab.db");
        let store = SqliteStore::open(&path).expect("store");
        store.ping().expect("ping");
        assert!(path.exists());
    }
}
