//! Local house builders and the individual houses they list.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    BuilderDetail, BuilderFields, BuilderId, BuilderInput, BuilderSummary, House, HouseBuilder,
    HouseFields, HouseId, HouseInput, HouseStatus,
};
pub use repository::BuilderRepository;
pub use router::builders_admin_router;
pub use service::BuilderService;
