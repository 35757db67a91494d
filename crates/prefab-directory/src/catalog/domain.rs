use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pricing::PriceRange;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ManufacturerId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Prefab home company as stored in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: ManufacturerId,
    pub name: String,
    pub slug: String,
    pub location: Option<String>,
    pub state: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin form payload for creating or replacing a manufacturer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManufacturerInput {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// Validated, normalized manufacturer columns handed to the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct ManufacturerFields {
    pub name: String,
    pub slug: String,
    pub location: Option<String>,
    pub state: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub published: bool,
}

/// A specific home product offered by a manufacturer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeModel {
    pub id: ModelId,
    pub manufacturer_id: ManufacturerId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub square_feet: Option<u32>,
    pub bedrooms: Option<u8>,
    pub bathrooms: Option<f32>,
    pub price_range: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub images: Vec<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInput {
    pub manufacturer_id: ManufacturerId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub square_feet: Option<u32>,
    #[serde(default)]
    pub bedrooms: Option<u8>,
    #[serde(default)]
    pub bathrooms: Option<f32>,
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelFields {
    pub manufacturer_id: ManufacturerId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub square_feet: Option<u32>,
    pub bedrooms: Option<u8>,
    pub bathrooms: Option<f32>,
    pub price_range: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub images: Vec<String>,
    pub published: bool,
}

/// Manufacturer name and slug embedded in model listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManufacturerRef {
    pub name: String,
    pub slug: String,
}

impl From<&Manufacturer> for ManufacturerRef {
    fn from(value: &Manufacturer) -> Self {
        Self {
            name: value.name.clone(),
            slug: value.slug.clone(),
        }
    }
}

/// Directory card for a manufacturer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManufacturerSummary {
    pub name: String,
    pub slug: String,
    pub location: Option<String>,
    pub state: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website: Option<String>,
    pub model_count: usize,
}

impl ManufacturerSummary {
    pub fn new(manufacturer: &Manufacturer, model_count: usize) -> Self {
        Self {
            name: manufacturer.name.clone(),
            slug: manufacturer.slug.clone(),
            location: manufacturer.location.clone(),
            state: manufacturer.state.clone(),
            coordinates: manufacturer.coordinates,
            description: manufacturer.description.clone(),
            logo_url: manufacturer.logo_url.clone(),
            website: manufacturer.website.clone(),
            model_count,
        }
    }
}

/// Public model card with the parsed price bounds alongside the display string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub slug: String,
    pub manufacturer: ManufacturerRef,
    pub category: Option<String>,
    pub square_feet: Option<u32>,
    pub bedrooms: Option<u8>,
    pub bathrooms: Option<f32>,
    pub price_range: Option<String>,
    pub price: Option<PriceRange>,
    pub tags: Vec<String>,
    pub image: Option<String>,
}

impl ModelSummary {
    pub fn new(model: &HomeModel, manufacturer: &Manufacturer) -> Self {
        Self {
            name: model.name.clone(),
            slug: model.slug.clone(),
            manufacturer: ManufacturerRef::from(manufacturer),
            category: model.category.clone(),
            square_feet: model.square_feet,
            bedrooms: model.bedrooms,
            bathrooms: model.bathrooms,
            price_range: model.price_range.clone(),
            price: model.price_range.as_deref().and_then(PriceRange::parse),
            tags: model.tags.clone(),
            image: model.images.first().cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManufacturerDetail {
    #[serde(flatten)]
    pub manufacturer: ManufacturerSummary,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub models: Vec<ModelSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDetail {
    #[serde(flatten)]
    pub summary: ModelSummary,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub images: Vec<String>,
    pub manufacturer_details: ManufacturerSummary,
    pub related: Vec<ModelSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub slug: String,
    pub model_count: usize,
}
