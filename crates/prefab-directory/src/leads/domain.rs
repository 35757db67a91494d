use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    Contact,
    Waitlist,
    Survey,
}

impl LeadKind {
    pub const fn label(self) -> &'static str {
        match self {
            LeadKind::Contact => "contact",
            LeadKind::Waitlist => "waitlist",
            LeadKind::Survey => "survey",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "contact" => Some(LeadKind::Contact),
            "waitlist" => Some(LeadKind::Waitlist),
            "survey" => Some(LeadKind::Survey),
            _ => None,
        }
    }
}

/// Captured form submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lead {
    pub id: LeadId,
    pub kind: LeadKind,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub zip: Option<String>,
    pub manufacturer_slug: Option<String>,
    pub model_slug: Option<String>,
    pub answers: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Where the lead came from, flattened into one export cell.
    pub fn context(&self) -> String {
        let mut parts = Vec::new();
        if let Some(slug) = &self.manufacturer_slug {
            parts.push(format!("manufacturer={slug}"));
        }
        if let Some(slug) = &self.model_slug {
            parts.push(format!("model={slug}"));
        }
        if let Some(zip) = &self.zip {
            parts.push(format!("zip={zip}"));
        }
        if let Some(answers) = &self.answers {
            parts.push(answers.to_string());
        }
        parts.join("; ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub kind: LeadKind,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub zip: Option<String>,
    pub manufacturer_slug: Option<String>,
    pub model_slug: Option<String>,
    pub answers: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WaitlistForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SurveyForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<u8>,
    #[serde(default)]
    pub owns_land: Option<bool>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

/// Survey answers persisted as a JSON object alongside the lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyAnswers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owns_land: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Acknowledgement returned to public form submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadReceipt {
    pub id: LeadId,
    pub kind: LeadKind,
    pub message: &'static str,
}
