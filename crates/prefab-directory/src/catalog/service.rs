use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::domain::{
    CategorySummary, Coordinates, HomeModel, Manufacturer, ManufacturerDetail, ManufacturerFields,
    ManufacturerId, ManufacturerInput, ManufacturerSummary, ModelDetail, ModelFields, ModelId,
    ModelInput, ModelSummary,
};
use super::map::{MapMarker, MapView};
use super::repository::{ManufacturerRepository, ModelRepository};
use super::search::{
    manufacturer_matches, model_matches, sort_manufacturers, sort_models, ListedModel,
    ManufacturerQuery, ModelQuery,
};
use crate::error::ServiceError;
use crate::slug::{self, slugify};
use crate::validation::{clean, ValidationErrors, Validator, MAX_NAME_LEN, MAX_TEXT_LEN};

const RELATED_MODEL_LIMIT: usize = 3;
const MAX_SQUARE_FEET: u32 = 20_000;
const MAX_ROOMS: u8 = 20;

/// Models listed under a single category page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryListing {
    #[serde(flatten)]
    pub category: CategorySummary,
    pub models: Vec<ModelSummary>,
}

/// Public directory queries plus the admin mutations for manufacturers and models.
#[derive(Clone)]
pub struct CatalogService {
    manufacturers: Arc<dyn ManufacturerRepository>,
    models: Arc<dyn ModelRepository>,
}

/// Published manufacturers and the published models that belong to them.
struct Visible {
    manufacturers: HashMap<ManufacturerId, Manufacturer>,
    models: Vec<HomeModel>,
}

impl Visible {
    fn listed(&self) -> Vec<ListedModel<'_>> {
        self.models
            .iter()
            .filter_map(|model| {
                self.manufacturers
                    .get(&model.manufacturer_id)
                    .map(|manufacturer| ListedModel {
                        model,
                        manufacturer,
                    })
            })
            .collect()
    }

    fn model_counts(&self) -> HashMap<ManufacturerId, usize> {
        let mut counts = HashMap::new();
        for model in &self.models {
            *counts.entry(model.manufacturer_id).or_insert(0) += 1;
        }
        counts
    }

    fn summarize(entries: &[ListedModel<'_>]) -> Vec<ModelSummary> {
        entries
            .iter()
            .map(|entry| ModelSummary::new(entry.model, entry.manufacturer))
            .collect()
    }
}

impl CatalogService {
    pub fn new(
        manufacturers: Arc<dyn ManufacturerRepository>,
        models: Arc<dyn ModelRepository>,
    ) -> Self {
        Self {
            manufacturers,
            models,
        }
    }

    fn visible(&self) -> Result<Visible, ServiceError> {
        let manufacturers: HashMap<_, _> = self
            .manufacturers
            .list()?
            .into_iter()
            .filter(|manufacturer| manufacturer.published)
            .map(|manufacturer| (manufacturer.id, manufacturer))
            .collect();

        let models = self
            .models
            .list()?
            .into_iter()
            .filter(|model| model.published && manufacturers.contains_key(&model.manufacturer_id))
            .collect();

        Ok(Visible {
            manufacturers,
            models,
        })
    }

    pub fn list_manufacturers(
        &self,
        query: &ManufacturerQuery,
    ) -> Result<Vec<ManufacturerSummary>, ServiceError> {
        let visible = self.visible()?;
        let counts = visible.model_counts();

        let mut entries: Vec<(&Manufacturer, usize)> = visible
            .manufacturers
            .values()
            .filter(|manufacturer| manufacturer_matches(manufacturer, query))
            .map(|manufacturer| {
                let count = counts.get(&manufacturer.id).copied().unwrap_or(0);
                (manufacturer, count)
            })
            .collect();
        sort_manufacturers(&mut entries, query.sort);

        Ok(entries
            .into_iter()
            .map(|(manufacturer, count)| ManufacturerSummary::new(manufacturer, count))
            .collect())
    }

    pub fn manufacturer_detail(&self, slug: &str) -> Result<ManufacturerDetail, ServiceError> {
        let visible = self.visible()?;
        let manufacturer = visible
            .manufacturers
            .values()
            .find(|manufacturer| manufacturer.slug == slug)
            .ok_or(ServiceError::NotFound("manufacturer"))?;

        let mut entries: Vec<_> = visible
            .listed()
            .into_iter()
            .filter(|entry| entry.manufacturer.id == manufacturer.id)
            .collect();
        sort_models(&mut entries, Default::default());

        Ok(ManufacturerDetail {
            manufacturer: ManufacturerSummary::new(manufacturer, entries.len()),
            email: manufacturer.email.clone(),
            phone: manufacturer.phone.clone(),
            models: Visible::summarize(&entries),
        })
    }

    pub fn search_models(&self, query: &ModelQuery) -> Result<Vec<ModelSummary>, ServiceError> {
        let visible = self.visible()?;
        let mut entries: Vec<_> = visible
            .listed()
            .into_iter()
            .filter(|entry| model_matches(entry, query))
            .collect();
        sort_models(&mut entries, query.sort);
        Ok(Visible::summarize(&entries))
    }

    pub fn model_detail(&self, slug: &str) -> Result<ModelDetail, ServiceError> {
        let visible = self.visible()?;
        let listed = visible.listed();
        let entry = listed
            .iter()
            .find(|entry| entry.model.slug == slug)
            .copied()
            .ok_or(ServiceError::NotFound("model"))?;

        let category = entry.model.category.as_deref().map(slugify);
        let mut related: Vec<ListedModel<'_>> = listed
            .iter()
            .filter(|other| other.model.id != entry.model.id)
            .filter(|other| {
                category.is_some() && other.model.category.as_deref().map(slugify) == category
            })
            .copied()
            .collect();
        sort_models(&mut related, Default::default());

        if related.len() < RELATED_MODEL_LIMIT {
            let mut siblings: Vec<_> = listed
                .iter()
                .filter(|other| {
                    other.model.id != entry.model.id
                        && other.manufacturer.id == entry.manufacturer.id
                        && !related.iter().any(|r| r.model.id == other.model.id)
                })
                .copied()
                .collect();
            sort_models(&mut siblings, Default::default());
            related.extend(siblings);
        }
        related.truncate(RELATED_MODEL_LIMIT);

        let counts = visible.model_counts();
        let model_count = counts.get(&entry.manufacturer.id).copied().unwrap_or(0);

        Ok(ModelDetail {
            summary: ModelSummary::new(entry.model, entry.manufacturer),
            description: entry.model.description.clone(),
            features: entry.model.features.clone(),
            images: entry.model.images.clone(),
            manufacturer_details: ManufacturerSummary::new(entry.manufacturer, model_count),
            related: Visible::summarize(&related),
        })
    }

    pub fn categories(&self) -> Result<Vec<CategorySummary>, ServiceError> {
        let visible = self.visible()?;
        let mut grouped: BTreeMap<String, CategorySummary> = BTreeMap::new();

        for model in &visible.models {
            let Some(name) = model.category.as_deref().map(str::trim) else {
                continue;
            };
            let slug = slugify(name);
            if slug.is_empty() {
                continue;
            }
            grouped
                .entry(slug.clone())
                .or_insert_with(|| CategorySummary {
                    name: name.to_string(),
                    slug,
                    model_count: 0,
                })
                .model_count += 1;
        }

        let mut categories: Vec<_> = grouped.into_values().collect();
        categories.sort_by_key(|category| category.name.to_lowercase());
        Ok(categories)
    }

    pub fn category_models(&self, slug: &str) -> Result<CategoryListing, ServiceError> {
        let category = self
            .categories()?
            .into_iter()
            .find(|category| category.slug == slug)
            .ok_or(ServiceError::NotFound("category"))?;

        let models = self.search_models(&ModelQuery {
            category: Some(category.slug.clone()),
            ..ModelQuery::default()
        })?;

        Ok(CategoryListing { category, models })
    }

    /// Markers follow the same text/state filter as the manufacturer list so both views agree.
    pub fn map_view(&self, query: &ManufacturerQuery) -> Result<MapView, ServiceError> {
        let visible = self.visible()?;
        let counts = visible.model_counts();

        let mut matching: Vec<(&Manufacturer, usize)> = visible
            .manufacturers
            .values()
            .filter(|manufacturer| manufacturer_matches(manufacturer, query))
            .map(|manufacturer| {
                let count = counts.get(&manufacturer.id).copied().unwrap_or(0);
                (manufacturer, count)
            })
            .collect();
        sort_manufacturers(&mut matching, query.sort);

        let markers = matching
            .into_iter()
            .filter_map(|(manufacturer, count)| MapMarker::new(manufacturer, count))
            .collect();

        Ok(MapView::from_markers(markers))
    }

    pub fn list_all_manufacturers(&self) -> Result<Vec<Manufacturer>, ServiceError> {
        Ok(self.manufacturers.list()?)
    }

    pub fn get_manufacturer(&self, id: ManufacturerId) -> Result<Manufacturer, ServiceError> {
        self.manufacturers
            .fetch(id)?
            .ok_or(ServiceError::NotFound("manufacturer"))
    }

    pub fn create_manufacturer(
        &self,
        input: ManufacturerInput,
    ) -> Result<Manufacturer, ServiceError> {
        let fields = manufacturer_fields(input)?;
        let created = self.manufacturers.insert(&fields)?;
        info!(id = created.id.0, slug = %created.slug, "manufacturer created");
        Ok(created)
    }

    pub fn update_manufacturer(
        &self,
        id: ManufacturerId,
        input: ManufacturerInput,
    ) -> Result<Manufacturer, ServiceError> {
        let fields = manufacturer_fields(input)?;
        let updated = self.manufacturers.update(id, &fields)?;
        info!(id = id.0, slug = %updated.slug, "manufacturer updated");
        Ok(updated)
    }

    pub fn delete_manufacturer(&self, id: ManufacturerId) -> Result<(), ServiceError> {
        self.manufacturers.delete(id)?;
        info!(id = id.0, "manufacturer deleted");
        Ok(())
    }

    pub fn list_all_models(
        &self,
        manufacturer: Option<ManufacturerId>,
    ) -> Result<Vec<HomeModel>, ServiceError> {
        let models = match manufacturer {
            Some(id) => self.models.list_for_manufacturer(id)?,
            None => self.models.list()?,
        };
        Ok(models)
    }

    pub fn get_model(&self, id: ModelId) -> Result<HomeModel, ServiceError> {
        self.models.fetch(id)?.ok_or(ServiceError::NotFound("model"))
    }

    pub fn create_model(&self, input: ModelInput) -> Result<HomeModel, ServiceError> {
        let fields = self.checked_model_fields(input)?;
        let created = self.models.insert(&fields)?;
        info!(id = created.id.0, slug = %created.slug, "model created");
        Ok(created)
    }

    pub fn update_model(&self, id: ModelId, input: ModelInput) -> Result<HomeModel, ServiceError> {
        let fields = self.checked_model_fields(input)?;
        let updated = self.models.update(id, &fields)?;
        info!(id = id.0, slug = %updated.slug, "model updated");
        Ok(updated)
    }

    pub fn delete_model(&self, id: ModelId) -> Result<(), ServiceError> {
        self.models.delete(id)?;
        info!(id = id.0, "model deleted");
        Ok(())
    }

    fn checked_model_fields(&self, input: ModelInput) -> Result<ModelFields, ServiceError> {
        let manufacturer_known = self.manufacturers.fetch(input.manufacturer_id)?.is_some();
        let mut fields = model_fields(input);
        if !manufacturer_known {
            let mut errors = fields.as_ref().err().cloned().unwrap_or_default();
            errors.add("manufacturer_id", "unknown manufacturer");
            fields = Err(errors);
        }
        Ok(fields?)
    }
}

fn manufacturer_fields(input: ManufacturerInput) -> Result<ManufacturerFields, ValidationErrors> {
    let mut validator = Validator::new();
    validator.required("name", &input.name, MAX_NAME_LEN);

    let slug = slug::resolve(input.slug.as_deref(), &input.name);
    validator.slug("slug", &slug);

    let state = clean(input.state).map(|state| state.to_ascii_uppercase());
    if let Some(state) = &state {
        if state.len() != 2 || !state.chars().all(|ch| ch.is_ascii_alphabetic()) {
            validator.fail("state", "must be a two-letter state code");
        }
    }

    let coordinates = match (input.latitude, input.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        (None, None) => None,
        _ => {
            validator.fail(
                "coordinates",
                "latitude and longitude must be provided together",
            );
            None
        }
    };

    validator
        .range("latitude", input.latitude, -90.0, 90.0)
        .range("longitude", input.longitude, -180.0, 180.0)
        .max_len("location", input.location.as_deref(), MAX_NAME_LEN)
        .max_len("description", input.description.as_deref(), MAX_TEXT_LEN)
        .optional_url("logo_url", input.logo_url.as_deref())
        .optional_url("website", input.website.as_deref())
        .optional_email("email", input.email.as_deref())
        .optional_phone("phone", input.phone.as_deref())
        .finish()?;

    Ok(ManufacturerFields {
        name: input.name.trim().to_string(),
        slug,
        location: clean(input.location),
        state,
        coordinates,
        description: clean(input.description),
        logo_url: clean(input.logo_url),
        website: clean(input.website),
        email: clean(input.email),
        phone: clean(input.phone),
        published: input.published,
    })
}

fn model_fields(input: ModelInput) -> Result<ModelFields, ValidationErrors> {
    let mut validator = Validator::new();
    validator.required("name", &input.name, MAX_NAME_LEN);

    let slug = slug::resolve(input.slug.as_deref(), &input.name);
    validator.slug("slug", &slug);

    if let Some(bathrooms) = input.bathrooms {
        if (bathrooms * 2.0).fract() != 0.0 {
            validator.fail("bathrooms", "must be a whole or half number");
        }
    }

    let images = normalize_list(input.images);
    validator
        .range("square_feet", input.square_feet, 1, MAX_SQUARE_FEET)
        .range("bedrooms", input.bedrooms, 0, MAX_ROOMS)
        .range("bathrooms", input.bathrooms, 0.0, f32::from(MAX_ROOMS))
        .max_len("price_range", input.price_range.as_deref(), 100)
        .max_len("category", input.category.as_deref(), 100)
        .max_len("description", input.description.as_deref(), MAX_TEXT_LEN)
        .urls("images", &images)
        .finish()?;

    Ok(ModelFields {
        manufacturer_id: input.manufacturer_id,
        name: input.name.trim().to_string(),
        slug,
        description: clean(input.description),
        square_feet: input.square_feet,
        bedrooms: input.bedrooms,
        bathrooms: input.bathrooms,
        price_range: clean(input.price_range),
        category: clean(input.category),
        tags: normalize_list(input.tags),
        features: normalize_list(input.features),
        images,
        published: input.published,
    })
}

/// Trims entries, drops blanks, and removes case-insensitive duplicates while keeping order.
fn normalize_list(values: Vec<String>) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    let mut normalized = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        normalized.push(trimmed.to_string());
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manufacturer_fields_derive_slug_and_upper_case_state() {
        let fields = manufacturer_fields(ManufacturerInput {
            name: "  Method Homes ".to_string(),
            state: Some("wa".to_string()),
            latitude: Some(47.6),
            longitude: Some(-122.3),
            email: Some("  ".to_string()),
            ..ManufacturerInput::default()
        })
        .expect("valid manufacturer");

        assert_eq!(fields.name, "Method Homes");
        assert_eq!(fields.slug, "method-homes");
        assert_eq!(fields.state.as_deref(), Some("WA"));
        assert!(fields.email.is_none());
        assert!(fields.coordinates.is_some());
    }

    #[test]
    fn manufacturer_coordinates_must_pair_and_stay_in_range() {
        let errors = manufacturer_fields(ManufacturerInput {
            name: "Half Pin".to_string(),
            latitude: Some(95.0),
            ..ManufacturerInput::default()
        })
        .expect_err("invalid coordinates");

        assert!(errors.get("coordinates").is_some());
        assert_eq!(errors.get("latitude"), Some("must be between -90 and 90"));
    }

    #[test]
    fn model_fields_reject_quarter_baths_and_bad_images() {
        let errors = model_fields(ModelInput {
            manufacturer_id: ManufacturerId(1),
            name: "Cottage".to_string(),
            bathrooms: Some(1.25),
            images: vec!["javascript:alert(1)".to_string()],
            ..ModelInput::default()
        })
        .expect_err("invalid model");

        assert_eq!(
            errors.get("bathrooms"),
            Some("must be a whole or half number")
        );
        assert!(errors.get("images").is_some());
    }

    #[test]
    fn list_normalization_trims_and_dedupes() {
        let tags = normalize_list(vec![
            " ADU ".to_string(),
            "adu".to_string(),
            "".to_string(),
            "Net Zero".to_string(),
        ]);
        assert_eq!(tags, ["ADU", "Net Zero"]);
    }
}
