use super::domain::{
    HomeModel, Manufacturer, ManufacturerFields, ManufacturerId, ModelFields, ModelId,
};
use crate::storage::StoreError;

/// Manufacturer persistence. Slug uniqueness is enforced by the backing store.
pub trait ManufacturerRepository: Send + Sync {
    fn insert(&self, fields: &ManufacturerFields) -> Result<Manufacturer, StoreError>;
    fn update(
        &self,
        id: ManufacturerId,
        fields: &ManufacturerFields,
    ) -> Result<Manufacturer, StoreError>;
    fn delete(&self, id: ManufacturerId) -> Result<(), StoreError>;
    fn fetch(&self, id: ManufacturerId) -> Result<Option<Manufacturer>, StoreError>;
    fn fetch_by_slug(&self, slug: &str) -> Result<Option<Manufacturer>, StoreError>;
    /// Every manufacturer, drafts included, ordered by name.
    fn list(&self) -> Result<Vec<Manufacturer>, StoreError>;
}

/// Home model persistence. Deleting a manufacturer removes its models.
pub trait ModelRepository: Send + Sync {
    fn insert(&self, fields: &ModelFields) -> Result<HomeModel, StoreError>;
    fn update(&self, id: ModelId, fields: &ModelFields) -> Result<HomeModel, StoreError>;
    fn delete(&self, id: ModelId) -> Result<(), StoreError>;
    fn fetch(&self, id: ModelId) -> Result<Option<HomeModel>, StoreError>;
    fn fetch_by_slug(&self, slug: &str) -> Result<Option<HomeModel>, StoreError>;
    /// Every model, drafts included, ordered by name.
    fn list(&self) -> Result<Vec<HomeModel>, StoreError>;
    fn list_for_manufacturer(&self, id: ManufacturerId) -> Result<Vec<HomeModel>, StoreError>;
}
