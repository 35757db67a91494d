use std::sync::Arc;

use tracing::info;

use super::domain::{
    ContactForm, Lead, LeadId, LeadKind, LeadReceipt, NewLead, SurveyAnswers, SurveyForm,
    WaitlistForm,
};
use super::repository::LeadRepository;
use crate::error::ServiceError;
use crate::storage::StoreError;
use crate::validation::{clean, Validator, MAX_NAME_LEN};

pub const MAX_MESSAGE_LEN: usize = 5_000;
pub const WAITLIST_DUPLICATE: &str = "This email is already on the waitlist";
const MAX_SURVEY_BEDROOMS: u8 = 10;
const MAX_ANSWER_LEN: usize = 200;

pub const EXPORT_HEADER: [&str; 8] = [
    "id",
    "kind",
    "name",
    "email",
    "phone",
    "message",
    "context",
    "created_at",
];

/// Public form intake and the admin lead inbox.
pub struct LeadService {
    leads: Arc<dyn LeadRepository>,
}

impl LeadService {
    pub fn new(leads: Arc<dyn LeadRepository>) -> Self {
        Self { leads }
    }

    pub fn submit_contact(&self, form: ContactForm) -> Result<LeadReceipt, ServiceError> {
        let mut validator = Validator::new();
        validator
            .required("name", &form.name, MAX_NAME_LEN)
            .email("email", &form.email)
            .optional_phone("phone", form.phone.as_deref())
            .required("message", &form.message, MAX_MESSAGE_LEN)
            .max_len("manufacturer", form.manufacturer.as_deref(), MAX_NAME_LEN)
            .max_len("model", form.model.as_deref(), MAX_NAME_LEN)
            .finish()?;

        let lead = self.leads.insert(&NewLead {
            kind: LeadKind::Contact,
            name: Some(form.name.trim().to_string()),
            email: normalize_email(&form.email),
            phone: clean(form.phone),
            message: Some(form.message.trim().to_string()),
            zip: None,
            manufacturer_slug: clean(form.manufacturer),
            model_slug: clean(form.model),
            answers: None,
        })?;

        info!(id = lead.id.0, kind = lead.kind.label(), "lead captured");
        Ok(receipt(&lead, "Thanks! We'll be in touch soon."))
    }

    pub fn join_waitlist(&self, form: WaitlistForm) -> Result<LeadReceipt, ServiceError> {
        let mut validator = Validator::new();
        validator
            .email("email", &form.email)
            .max_len("name", form.name.as_deref(), MAX_NAME_LEN)
            .optional_zip("zip", form.zip.as_deref())
            .finish()?;

        let email = normalize_email(&form.email);
        if self.leads.waitlist_contains(&email)? {
            return Err(ServiceError::Conflict(WAITLIST_DUPLICATE.to_string()));
        }

        let inserted = self.leads.insert(&NewLead {
            kind: LeadKind::Waitlist,
            name: clean(form.name),
            email,
            phone: None,
            message: None,
            zip: clean(form.zip),
            manufacturer_slug: None,
            model_slug: None,
            answers: None,
        });
        let lead = match inserted {
            Ok(lead) => lead,
            Err(StoreError::Conflict { .. }) => {
                return Err(ServiceError::Conflict(WAITLIST_DUPLICATE.to_string()))
            }
            Err(err) => return Err(err.into()),
        };

        info!(id = lead.id.0, kind = lead.kind.label(), "lead captured");
        Ok(receipt(&lead, "You're on the list!"))
    }

    pub fn submit_survey(&self, form: SurveyForm) -> Result<LeadReceipt, ServiceError> {
        let interests: Vec<String> = form
            .interests
            .iter()
            .map(|interest| interest.trim().to_string())
            .filter(|interest| !interest.is_empty())
            .collect();

        let mut validator = Validator::new();
        validator
            .email("email", &form.email)
            .max_len("name", form.name.as_deref(), MAX_NAME_LEN)
            .optional_zip("zip", form.zip.as_deref())
            .max_len("budget", form.budget.as_deref(), MAX_ANSWER_LEN)
            .max_len("timeline", form.timeline.as_deref(), MAX_ANSWER_LEN)
            .range("bedrooms", form.bedrooms, 0, MAX_SURVEY_BEDROOMS)
            .max_len("comments", form.comments.as_deref(), MAX_MESSAGE_LEN);
        if interests.len() > 20 || interests.iter().any(|i| i.chars().count() > MAX_ANSWER_LEN) {
            validator.fail("interests", "too many or too long");
        }
        validator.finish()?;

        let answers = SurveyAnswers {
            budget: clean(form.budget),
            timeline: clean(form.timeline),
            bedrooms: form.bedrooms,
            owns_land: form.owns_land,
            interests,
            comments: clean(form.comments),
        };
        let answers =
            serde_json::to_value(&answers).map_err(|err| ServiceError::Internal(err.to_string()))?;

        let lead = self.leads.insert(&NewLead {
            kind: LeadKind::Survey,
            name: clean(form.name),
            email: normalize_email(&form.email),
            phone: None,
            message: None,
            zip: clean(form.zip),
            manufacturer_slug: None,
            model_slug: None,
            answers: Some(answers),
        })?;

        info!(id = lead.id.0, kind = lead.kind.label(), "lead captured");
        Ok(receipt(&lead, "Thanks for sharing your plans!"))
    }

    pub fn list_leads(&self, kind: Option<LeadKind>) -> Result<Vec<Lead>, ServiceError> {
        Ok(self.leads.list(kind)?)
    }

    pub fn get_lead(&self, id: LeadId) -> Result<Lead, ServiceError> {
        self.leads.fetch(id)?.ok_or(ServiceError::NotFound("lead"))
    }

    pub fn delete_lead(&self, id: LeadId) -> Result<(), ServiceError> {
        self.leads.delete(id)?;
        info!(id = id.0, "lead deleted");
        Ok(())
    }

    /// CSV document of the selected leads, newest first.
    pub fn export_csv(&self, kind: Option<LeadKind>) -> Result<String, ServiceError> {
        let leads = self.leads.list(kind)?;
        let csv = write_csv(&leads).map_err(|err| ServiceError::Internal(err.to_string()))?;
        info!(rows = leads.len(), "leads exported");
        Ok(csv)
    }
}

fn receipt(lead: &Lead, message: &'static str) -> LeadReceipt {
    LeadReceipt {
        id: lead.id,
        kind: lead.kind,
        message,
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn write_csv(leads: &[Lead]) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;

    for lead in leads {
        writer.write_record([
            lead.id.0.to_string(),
            lead.kind.label().to_string(),
            lead.name.clone().unwrap_or_default(),
            lead.email.clone(),
            lead.phone.clone().unwrap_or_default(),
            lead.message.clone().unwrap_or_default(),
            lead.context(),
            lead.created_at.to_rfc3339(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|err| err.to_string())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn lead(id: i64, kind: LeadKind) -> Lead {
        Lead {
            id: LeadId(id),
            kind,
            name: Some("Dana, Jr.".to_string()),
            email: "dana@example.com".to_string(),
            phone: None,
            message: Some("Line one\nline \"two\"".to_string()),
            zip: None,
            manufacturer_slug: Some("method-homes".to_string()),
            model_slug: None,
            answers: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn csv_quotes_commas_and_newlines() {
        let csv = write_csv(&[lead(4, LeadKind::Contact)]).expect("csv");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("id,kind,name,email,phone,message,context,created_at")
        );
        assert!(csv.contains("4,contact,\"Dana, Jr.\",dana@example.com,,\"Line one\nline \"\"two\"\"\",manufacturer=method-homes,2025-03-01T12:00:00+00:00"));
    }

    #[test]
    fn empty_export_still_has_header() {
        let csv = write_csv(&[]).expect("csv");
        assert_eq!(csv, "id,kind,name,email,phone,message,context,created_at\n");
    }

    #[test]
    fn survey_answers_skip_blank_fields() {
        let answers = SurveyAnswers {
            budget: Some("$200k-$300k".to_string()),
            timeline: None,
            bedrooms: Some(3),
            owns_land: Some(true),
            interests: Vec::new(),
            comments: None,
        };
        let value = serde_json::to_value(&answers).expect("json");
        assert_eq!(
            value,
            serde_json::json!({"budget": "$200k-$300k", "bedrooms": 3, "owns_land": true})
        );
    }
}
