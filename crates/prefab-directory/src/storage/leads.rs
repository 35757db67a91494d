use rusqlite::{params, Connection, OptionalExtension, Row};

use super::sqlite::{
    backend, classify, not_found_unless_changed, now_text, read_json, read_label,
    read_timestamp, SqliteStore,
};
use super::StoreError;
use crate::leads::{Lead, LeadId, LeadKind, LeadRepository, NewLead};

const LEAD_COLUMNS: &str = "id, kind, name, email, phone, message, zip, manufacturer_slug, \
     model_slug, answers, created_at";

fn lead_from_row(row: &Row<'_>) -> rusqlite::Result<Lead> {
    Ok(Lead {
        id: LeadId(row.get("id")?),
        kind: read_label(row, "kind", LeadKind::from_label)?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        message: row.get("message")?,
        zip: row.get("zip")?,
        manufacturer_slug: row.get("manufacturer_slug")?,
        model_slug: row.get("model_slug")?,
        answers: read_json(row, "answers")?,
        created_at: read_timestamp(row, "created_at")?,
    })
}

fn lead_by_id(conn: &Connection, id: i64) -> Result<Option<Lead>, StoreError> {
    conn.query_row(
        &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"),
        [id],
        lead_from_row,
    )
    .optional()
    .map_err(backend)
}

impl LeadRepository for SqliteStore {
    fn insert(&self, lead: &NewLead) -> Result<Lead, StoreError> {
        let conn = self.connection();
        conn.execute(
            "INSERT INTO leads (kind, name, email, phone, message, zip, manufacturer_slug, \
             model_slug, answers, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                lead.kind.label(),
                lead.name,
                lead.email,
                lead.phone,
                lead.message,
                lead.zip,
                lead.manufacturer_slug,
                lead.model_slug,
                lead.answers.as_ref().map(|answers| answers.to_string()),
                now_text(),
            ],
        )
        .map_err(|err| classify(err, "lead", "lead"))?;

        lead_by_id(&conn, conn.last_insert_rowid())?
            .ok_or(StoreError::NotFound { entity: "lead" })
    }

    fn delete(&self, id: LeadId) -> Result<(), StoreError> {
        let changed = self
            .connection()
            .execute("DELETE FROM leads WHERE id = ?1", [id.0])
            .map_err(backend)?;
        not_found_unless_changed(changed, "lead")
    }

    fn fetch(&self, id: LeadId) -> Result<Option<Lead>, StoreError> {
        lead_by_id(&self.connection(), id.0)
    }

    fn list(&self, kind: Option<LeadKind>) -> Result<Vec<Lead>, StoreError> {
        let conn = self.connection();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {LEAD_COLUMNS} FROM leads WHERE (?1 IS NULL OR kind = ?1) \
                 ORDER BY created_at DESC, id DESC"
            ))
            .map_err(backend)?;
        let rows = stmt
            .query_map([kind.map(LeadKind::label)], lead_from_row)
            .map_err(backend)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(backend)
    }

    fn waitlist_contains(&self, email: &str) -> Result<bool, StoreError> {
        self.connection()
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM leads WHERE kind = 'waitlist' AND email = ?1)",
                [email],
                |row| row.get(0),
            )
            .map_err(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waitlist(email: &str) -> NewLead {
        NewLead {
            kind: LeadKind::Waitlist,
            name: None,
            email: email.to_string(),
            phone: None,
            message: None,
            zip: Some("97701".to_string()),
            manufacturer_slug: None,
            model_slug: None,
            answers: None,
        }
    }

    #[test]
    fn waitlist_email_is_unique_only_within_waitlist() {
        let store = SqliteStore::open_in_memory().expect("store");
        store.insert(&waitlist("pat@example.com")).expect("first");
        assert!(store.waitlist_contains("pat@example.com").expect("exists"));

        let err = store
            .insert(&waitlist("pat@example.com"))
            .expect_err("duplicate");
        assert!(matches!(err, StoreError::Conflict { .. }));

        let contact = NewLead {
            kind: LeadKind::Contact,
            message: Some("Question".to_string()),
            ..waitlist("pat@example.com")
        };
        store.insert(&contact).expect("contact with same email");
    }

    #[test]
    fn list_filters_by_kind_newest_first() {
        let store = SqliteStore::open_in_memory().expect("store");
        let first = store.insert(&waitlist("a@example.com")).expect("a");
        let second = store.insert(&waitlist("b@example.com")).expect("b");
        let survey = NewLead {
            kind: LeadKind::Survey,
            answers: Some(serde_json::json!({"bedrooms": 3})),
            ..waitlist("c@example.com")
        };
        store.insert(&survey).expect("survey");

        let waitlisted = store.list(Some(LeadKind::Waitlist)).expect("list");
        let ids: Vec<_> = waitlisted.iter().map(|lead| lead.id).collect();
        assert_eq!(ids, [second.id, first.id]);

        let all = store.list(None).expect("all");
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].answers, Some(serde_json::json!({"bedrooms": 3})));
    }
}
