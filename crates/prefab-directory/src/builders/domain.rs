use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuilderId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HouseId(pub i64);

/// Local builder whose individual houses are listed in the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseBuilder {
    pub id: BuilderId,
    pub name: String,
    pub slug: String,
    pub location: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuilderInput {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderFields {
    pub name: String,
    pub slug: String,
    pub location: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseStatus {
    #[default]
    Available,
    Pending,
    Sold,
}

impl HouseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            HouseStatus::Available => "available",
            HouseStatus::Pending => "pending",
            HouseStatus::Sold => "sold",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "available" => Some(HouseStatus::Available),
            "pending" => Some(HouseStatus::Pending),
            "sold" => Some(HouseStatus::Sold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct House {
    pub id: HouseId,
    pub builder_id: BuilderId,
    pub title: String,
    pub address: Option<String>,
    pub price: u64,
    pub bedrooms: Option<u8>,
    pub bathrooms: Option<f32>,
    pub square_feet: Option<u32>,
    pub status: HouseStatus,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HouseInput {
    pub title: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub bedrooms: Option<u8>,
    #[serde(default)]
    pub bathrooms: Option<f32>,
    #[serde(default)]
    pub square_feet: Option<u32>,
    #[serde(default)]
    pub status: HouseStatus,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HouseFields {
    pub builder_id: BuilderId,
    pub title: String,
    pub address: Option<String>,
    pub price: u64,
    pub bedrooms: Option<u8>,
    pub bathrooms: Option<f32>,
    pub square_feet: Option<u32>,
    pub status: HouseStatus,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderSummary {
    #[serde(flatten)]
    pub builder: HouseBuilder,
    pub house_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderDetail {
    #[serde(flatten)]
    pub builder: HouseBuilder,
    pub houses: Vec<House>,
}
