use crate::infra::open_store;
use clap::Args;
use prefab_directory::blog::PostInput;
use prefab_directory::builders::{BuilderInput, HouseInput, HouseStatus};
use prefab_directory::catalog::{ManufacturerInput, ModelInput};
use prefab_directory::config::AppConfig;
use prefab_directory::error::{AppError, ServiceError};
use prefab_directory::http::DirectoryServices;

#[derive(Args, Debug, Default)]
pub(crate) struct SeedArgs {
    /// Override DATABASE_PATH
    #[arg(long)]
    pub(crate) database: Option<String>,
}

/// Counts of rows written by a seed run; all zero when the catalog already had data.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SeedSummary {
    pub(crate) manufacturers: usize,
    pub(crate) models: usize,
    pub(crate) posts: usize,
    pub(crate) builders: usize,
    pub(crate) houses: usize,
}

pub(crate) fn run_seed(args: SeedArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(database) = args.database {
        config.database.path = database;
    }

    let store = open_store(&config)?;
    let services = DirectoryServices::from_config(store, &config);
    let summary = seed_demo_content(&services)?;

    if summary == SeedSummary::default() {
        println!("Catalog already has manufacturers; nothing seeded.");
    } else {
        println!(
            "Seeded {} manufacturers, {} models, {} blog posts, {} builders, {} houses.",
            summary.manufacturers,
            summary.models,
            summary.posts,
            summary.builders,
            summary.houses
        );
    }
    Ok(())
}

struct DemoModel {
    name: &'static str,
    square_feet: u32,
    bedrooms: u8,
    bathrooms: f32,
    price_range: &'static str,
    category: &'static str,
    tags: &'static [&'static str],
    features: &'static [&'static str],
}

struct DemoManufacturer {
    name: &'static str,
    location: &'static str,
    state: &'static str,
    latitude: f64,
    longitude: f64,
    description: &'static str,
    website: &'static str,
    models: &'static [DemoModel],
}

const DEMO_MANUFACTURERS: &[DemoManufacturer] = &[
    DemoManufacturer {
        name: "Cascade Modular Homes",
        location: "Bend, OR",
        state: "OR",
        latitude: 44.0582,
        longitude: -121.3153,
        description: "Energy-efficient modular homes built for high desert winters.",
        website: "https://cascade-modular.example.com",
        models: &[
            DemoModel {
                name: "Ridgeline 2",
                square_feet: 980,
                bedrooms: 2,
                bathrooms: 1.0,
                price_range: "$189,000 - $225,000",
                category: "Modular",
                tags: &["energy efficient", "small footprint"],
                features: &["Heat pump", "Triple-pane windows"],
            },
            DemoModel {
                name: "Summit Family",
                square_feet: 1860,
                bedrooms: 4,
                bathrooms: 2.5,
                price_range: "$329,000 - $389,000",
                category: "Modular",
                tags: &["family"],
                features: &["Mudroom", "Vaulted great room"],
            },
        ],
    },
    DemoManufacturer {
        name: "Blue Pine ADU Co",
        location: "Asheville, NC",
        state: "NC",
        latitude: 35.5951,
        longitude: -82.5515,
        description: "Backyard cottages and accessory dwelling units delivered in one piece.",
        website: "https://bluepine-adu.example.com",
        models: &[DemoModel {
            name: "Laurel Studio",
            square_feet: 420,
            bedrooms: 0,
            bathrooms: 1.0,
            price_range: "Starting at $98,500",
            category: "ADU",
            tags: &["adu", "studio"],
            features: &["Murphy bed", "Full kitchen"],
        }],
    },
];

/// Inserts the demo catalog, one published blog post, and a builder with a listing.
/// Does nothing when any manufacturer already exists.
pub(crate) fn seed_demo_content(services: &DirectoryServices) -> Result<SeedSummary, ServiceError> {
    if !services.catalog.list_all_manufacturers()?.is_empty() {
        return Ok(SeedSummary::default());
    }

    let mut summary = SeedSummary::default();
    for demo in DEMO_MANUFACTURERS {
        let manufacturer = services.catalog.create_manufacturer(ManufacturerInput {
            name: demo.name.to_string(),
            location: Some(demo.location.to_string()),
            state: Some(demo.state.to_string()),
            latitude: Some(demo.latitude),
            longitude: Some(demo.longitude),
            description: Some(demo.description.to_string()),
            website: Some(demo.website.to_string()),
            published: true,
            ..ManufacturerInput::default()
        })?;
        summary.manufacturers += 1;

        for model in demo.models {
            services.catalog.create_model(ModelInput {
                manufacturer_id: manufacturer.id,
                name: model.name.to_string(),
                square_feet: Some(model.square_feet),
                bedrooms: Some(model.bedrooms),
                bathrooms: Some(model.bathrooms),
                price_range: Some(model.price_range.to_string()),
                category: Some(model.category.to_string()),
                tags: to_strings(model.tags),
                features: to_strings(model.features),
                published: true,
                ..ModelInput::default()
            })?;
            summary.models += 1;
        }
    }

    services.blog.create_post(
        None,
        PostInput {
            title: "What to ask before buying a prefab home".to_string(),
            content: "Start with **land**. Zoning, utilities, and access decide what you can place.\n\n\
                      - Confirm setbacks with your county\n\
                      - Price the foundation separately\n\
                      - Ask who handles delivery and crane time"
                .to_string(),
            published: true,
            ..PostInput::default()
        },
    )?;
    summary.posts += 1;

    let builder = services.builders.create_builder(BuilderInput {
        name: "High Desert Builders".to_string(),
        location: Some("Redmond, OR".to_string()),
        website: Some("https://highdesert-builders.example.com".to_string()),
        description: Some("Set and finish crew for Central Oregon modular placements.".to_string()),
        ..BuilderInput::default()
    })?;
    summary.builders += 1;

    services.builders.create_house(
        builder.id,
        HouseInput {
            title: "Ridgeline 2 on a half acre".to_string(),
            address: Some("1420 Juniper Ln, Redmond, OR".to_string()),
            price: 312_000,
            bedrooms: Some(2),
            bathrooms: Some(1.0),
            square_feet: Some(980),
            status: HouseStatus::Available,
            ..HouseInput::default()
        },
    )?;
    summary.houses += 1;

    Ok(summary)
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prefab_directory::catalog::ModelQuery;
    use prefab_directory::storage::SqliteStore;
    use prefab_directory::uploads::UploadStore;
    use std::sync::Arc;

    fn services() -> DirectoryServices {
        let store = Arc::new(SqliteStore::open_in_memory().expect("store"));
        DirectoryServices::new(
            store,
            UploadStore::new("unused-uploads", 1024),
            chrono::Duration::hours(1),
        )
    }

    #[test]
    fn seeds_once() {
        let services = services();

        let first = seed_demo_content(&services).expect("seed");
        assert_eq!(first.manufacturers, 2);
        assert_eq!(first.models, 3);
        assert_eq!(first.posts, 1);
        assert_eq!(first.houses, 1);

        let second = seed_demo_content(&services).expect("reseed");
        assert_eq!(second, SeedSummary::default());
        assert_eq!(services.catalog.list_all_manufacturers().expect("list").len(), 2);
    }

    #[test]
    fn seeded_content_is_public() {
        let services = services();
        seed_demo_content(&services).expect("seed");

        let models = services
            .catalog
            .search_models(&ModelQuery::default())
            .expect("search");
        assert_eq!(models.len(), 3);

        let posts = services.blog.list_published(None).expect("posts");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "what-to-ask-before-buying-a-prefab-home");
    }
}
