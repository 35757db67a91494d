//! Manufacturer and model directory: public browsing, search, categories, the map feed, and
//! the admin mutations behind them.

pub mod domain;
pub mod map;
pub mod pricing;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;

pub use domain::{
    CategorySummary, Coordinates, HomeModel, Manufacturer, ManufacturerDetail, ManufacturerFields,
    ManufacturerId, ManufacturerInput, ManufacturerRef, ManufacturerSummary, ModelDetail,
    ModelFields, ModelId, ModelInput, ModelSummary,
};
pub use map::{MapBounds, MapMarker, MapView};
pub use pricing::PriceRange;
pub use repository::{ManufacturerRepository, ModelRepository};
pub use router::{catalog_admin_router, catalog_router};
pub use search::{ManufacturerQuery, ManufacturerSort, ModelQuery, ModelSort};
pub use service::{CatalogService, CategoryListing};
