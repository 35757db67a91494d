//! Directory filtering and ordering for manufacturer and model listings.

use std::cmp::Ordering;

use serde::Deserialize;

use super::domain::{HomeModel, Manufacturer};
use super::pricing::PriceRange;
use crate::slug::slugify;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManufacturerSort {
    #[default]
    Name,
    Newest,
    Models,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ManufacturerQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub sort: ManufacturerSort,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSort {
    #[default]
    Featured,
    Name,
    PriceAsc,
    PriceDesc,
    SizeAsc,
    SizeDesc,
    Newest,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub min_bedrooms: Option<u8>,
    #[serde(default)]
    pub min_bathrooms: Option<f32>,
    #[serde(default)]
    pub min_sqft: Option<u32>,
    #[serde(default)]
    pub max_sqft: Option<u32>,
    #[serde(default)]
    pub max_price: Option<u64>,
    #[serde(default)]
    pub sort: ModelSort,
}

/// A model paired with its manufacturer so text search can span both.
#[derive(Debug, Clone, Copy)]
pub struct ListedModel<'a> {
    pub model: &'a HomeModel,
    pub manufacturer: &'a Manufacturer,
}

impl ListedModel<'_> {
    fn price(&self) -> Option<PriceRange> {
        self.model.price_range.as_deref().and_then(PriceRange::parse)
    }

    fn haystack(&self) -> String {
        let mut text = String::new();
        for part in [
            Some(self.model.name.as_str()),
            Some(self.manufacturer.name.as_str()),
            self.model.category.as_deref(),
            self.model.description.as_deref(),
        ]
        .into_iter()
        .flatten()
        {
            text.push_str(part);
            text.push(' ');
        }
        for part in self.model.tags.iter().chain(self.model.features.iter()) {
            text.push_str(part);
            text.push(' ');
        }
        text.to_lowercase()
    }
}

/// Every whitespace-separated term must appear somewhere in the haystack.
fn matches_terms(haystack: &str, query: Option<&str>) -> bool {
    let Some(query) = query.map(str::trim).filter(|value| !value.is_empty()) else {
        return true;
    };
    let query = query.to_lowercase();
    query.split_whitespace().all(|term| haystack.contains(term))
}

fn manufacturer_haystack(manufacturer: &Manufacturer) -> String {
    [
        Some(manufacturer.name.as_str()),
        manufacturer.location.as_deref(),
        manufacturer.state.as_deref(),
        manufacturer.description.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

pub fn manufacturer_matches(manufacturer: &Manufacturer, query: &ManufacturerQuery) -> bool {
    if let Some(state) = query.state.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let same_state = manufacturer
            .state
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case(state));
        if !same_state {
            return false;
        }
    }

    matches_terms(&manufacturer_haystack(manufacturer), query.q.as_deref())
}

/// Orders `(manufacturer, model_count)` pairs in place.
pub fn sort_manufacturers(entries: &mut [(&Manufacturer, usize)], sort: ManufacturerSort) {
    entries.sort_by(|(a, a_count), (b, b_count)| match sort {
        ManufacturerSort::Name => compare_names(&a.name, &b.name),
        ManufacturerSort::Newest => b
            .created_at
            .cmp(&a.created_at)
            .then_with(|| compare_names(&a.name, &b.name)),
        ManufacturerSort::Models => b_count
            .cmp(a_count)
            .then_with(|| compare_names(&a.name, &b.name)),
    });
}

pub fn model_matches(entry: &ListedModel<'_>, query: &ModelQuery) -> bool {
    let model = entry.model;

    if let Some(category) = non_empty(query.category.as_deref()) {
        let wanted = slugify(category);
        let matches = model
            .category
            .as_deref()
            .is_some_and(|value| slugify(value) == wanted);
        if !matches {
            return false;
        }
    }

    if let Some(manufacturer) = non_empty(query.manufacturer.as_deref()) {
        if entry.manufacturer.slug != manufacturer {
            return false;
        }
    }

    if let Some(min) = query.min_bedrooms {
        if model.bedrooms.map_or(true, |value| value < min) {
            return false;
        }
    }

    if let Some(min) = query.min_bathrooms {
        if model.bathrooms.map_or(true, |value| value < min) {
            return false;
        }
    }

    if let Some(min) = query.min_sqft {
        if model.square_feet.map_or(true, |value| value < min) {
            return false;
        }
    }

    if let Some(max) = query.max_sqft {
        if model.square_feet.map_or(true, |value| value > max) {
            return false;
        }
    }

    if let Some(max) = query.max_price {
        if entry.price().map_or(true, |price| price.min > max) {
            return false;
        }
    }

    matches_terms(&entry.haystack(), query.q.as_deref())
}

pub fn sort_models(entries: &mut [ListedModel<'_>], sort: ModelSort) {
    entries.sort_by(|a, b| {
        let by_name = || compare_names(&a.model.name, &b.model.name);
        match sort {
            ModelSort::Featured => compare_names(&a.manufacturer.name, &b.manufacturer.name)
                .then_with(by_name),
            ModelSort::Name => by_name(),
            ModelSort::PriceAsc => {
                missing_last(a.price().map(|p| p.min), b.price().map(|p| p.min), false)
                    .then_with(by_name)
            }
            ModelSort::PriceDesc => {
                missing_last(a.price().map(|p| p.min), b.price().map(|p| p.min), true)
                    .then_with(by_name)
            }
            ModelSort::SizeAsc => {
                missing_last(a.model.square_feet, b.model.square_feet, false).then_with(by_name)
            }
            ModelSort::SizeDesc => {
                missing_last(a.model.square_feet, b.model.square_feet, true).then_with(by_name)
            }
            ModelSort::Newest => b
                .model
                .created_at
                .cmp(&a.model.created_at)
                .then_with(by_name),
        }
    });
}

/// Orders known values ascending (or descending) and always puts missing values at the end.
fn missing_last<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::{ManufacturerId, ModelId};
    use chrono::{TimeZone, Utc};

    fn manufacturer(id: i64, name: &str, state: &str) -> Manufacturer {
        let created = Utc.with_ymd_and_hms(2024, 1, id as u32, 0, 0, 0).unwrap();
        Manufacturer {
            id: ManufacturerId(id),
            name: name.to_string(),
            slug: slugify(name),
            location: Some(format!("Somewhere, {state}")),
            state: Some(state.to_string()),
            coordinates: None,
            description: Some("Factory-built homes".to_string()),
            logo_url: None,
            website: None,
            email: None,
            phone: None,
            published: true,
            created_at: created,
            updated_at: created,
        }
    }

    fn model(
        id: i64,
        name: &str,
        price: Option<&str>,
        sqft: Option<u32>,
        bedrooms: Option<u8>,
    ) -> HomeModel {
        let created = Utc.with_ymd_and_hms(2024, 2, id as u32, 0, 0, 0).unwrap();
        HomeModel {
            id: ModelId(id),
            manufacturer_id: ManufacturerId(1),
            name: name.to_string(),
            slug: slugify(name),
            description: None,
            square_feet: sqft,
            bedrooms,
            bathrooms: Some(1.5),
            price_range: price.map(str::to_string),
            category: Some("Backyard ADU".to_string()),
            tags: vec!["net-zero".to_string()],
            features: vec!["Solar ready".to_string()],
            images: Vec::new(),
            published: true,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn text_search_requires_every_term() {
        let maker = manufacturer(1, "Cascade Modular", "OR");
        let studio = model(1, "Studio 400", Some("$95k"), Some(400), Some(0));
        let entry = ListedModel {
            model: &studio,
            manufacturer: &maker,
        };

        let query = |q: &str| ModelQuery {
            q: Some(q.to_string()),
            ..ModelQuery::default()
        };
        assert!(model_matches(&entry, &query("cascade studio")));
        assert!(model_matches(&entry, &query("SOLAR")));
        assert!(!model_matches(&entry, &query("cascade cabin")));
    }

    #[test]
    fn category_filter_compares_slugs() {
        let maker = manufacturer(1, "Cascade Modular", "OR");
        let studio = model(1, "Studio 400", None, None, None);
        let entry = ListedModel {
            model: &studio,
            manufacturer: &maker,
        };
        let query = ModelQuery {
            category: Some("backyard-adu".to_string()),
            ..ModelQuery::default()
        };
        assert!(model_matches(&entry, &query));
    }

    #[test]
    fn max_price_excludes_unpriced_models() {
        let maker = manufacturer(1, "Cascade Modular", "OR");
        let priced = model(1, "Priced", Some("$150,000 - $200,000"), None, None);
        let unpriced = model(2, "Call Us", Some("Contact for pricing"), None, None);
        let query = ModelQuery {
            max_price: Some(160_000),
            ..ModelQuery::default()
        };

        assert!(model_matches(
            &ListedModel {
                model: &priced,
                manufacturer: &maker
            },
            &query
        ));
        assert!(!model_matches(
            &ListedModel {
                model: &unpriced,
                manufacturer: &maker
            },
            &query
        ));
    }

    #[test]
    fn numeric_minimums_exclude_unknown_values() {
        let maker = manufacturer(1, "Cascade Modular", "OR");
        let unknown = model(1, "Unknown", None, None, None);
        let query = ModelQuery {
            min_bedrooms: Some(1),
            ..ModelQuery::default()
        };
        assert!(!model_matches(
            &ListedModel {
                model: &unknown,
                manufacturer: &maker
            },
            &query
        ));
    }

    #[test]
    fn price_sorts_put_unpriced_models_last() {
        let maker = manufacturer(1, "Cascade Modular", "OR");
        let cheap = model(1, "Cheap", Some("$90k"), None, None);
        let pricey = model(2, "Pricey", Some("$400k"), None, None);
        let unknown = model(3, "Unknown", None, None, None);
        let mut entries: Vec<ListedModel<'_>> = [&unknown, &pricey, &cheap]
            .into_iter()
            .map(|model| ListedModel {
                model,
                manufacturer: &maker,
            })
            .collect();

        sort_models(&mut entries, ModelSort::PriceAsc);
        let names: Vec<_> = entries.iter().map(|e| e.model.name.as_str()).collect();
        assert_eq!(names, ["Cheap", "Pricey", "Unknown"]);

        sort_models(&mut entries, ModelSort::PriceDesc);
        let names: Vec<_> = entries.iter().map(|e| e.model.name.as_str()).collect();
        assert_eq!(names, ["Pricey", "Cheap", "Unknown"]);
    }

    #[test]
    fn size_desc_orders_largest_first() {
        let maker = manufacturer(1, "Cascade Modular", "OR");
        let small = model(1, "Small", None, Some(400), None);
        let large = model(2, "Large", None, Some(1800), None);
        let mut entries = vec![
            ListedModel {
                model: &small,
                manufacturer: &maker,
            },
            ListedModel {
                model: &large,
                manufacturer: &maker,
            },
        ];
        sort_models(&mut entries, ModelSort::SizeDesc);
        assert_eq!(entries[0].model.name, "Large");
    }

    #[test]
    fn manufacturer_state_filter_is_case_insensitive() {
        let maker = manufacturer(1, "Cascade Modular", "OR");
        let query = ManufacturerQuery {
            state: Some("or".to_string()),
            ..ManufacturerQuery::default()
        };
        assert!(manufacturer_matches(&maker, &query));

        let query = ManufacturerQuery {
            state: Some("WA".to_string()),
            ..ManufacturerQuery::default()
        };
        assert!(!manufacturer_matches(&maker, &query));
    }

    #[test]
    fn manufacturers_sort_by_model_count_then_name() {
        let a = manufacturer(1, "Alpine Prefab", "CO");
        let b = manufacturer(2, "Bayside Homes", "CA");
        let c = manufacturer(3, "Cedar Works", "WA");
        let mut entries = vec![(&a, 1), (&b, 3), (&c, 3)];
        sort_manufacturers(&mut entries, ManufacturerSort::Models);
        let names: Vec<_> = entries.iter().map(|(m, _)| m.name.as_str()).collect();
        assert_eq!(names, ["Bayside Homes", "Cedar Works", "Alpine Prefab"]);

        sort_manufacturers(&mut entries, ManufacturerSort::Newest);
        assert_eq!(entries[0].0.name, "Cedar Works");
    }
}
