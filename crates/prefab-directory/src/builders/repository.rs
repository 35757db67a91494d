use super::domain::{
    BuilderFields, BuilderId, House, HouseBuilder, HouseFields, HouseId,
};
use crate::storage::StoreError;

/// Builder and house persistence. Deleting a builder removes its houses.
pub trait BuilderRepository: Send + Sync {
    fn insert_builder(&self, fields: &BuilderFields) -> Result<HouseBuilder, StoreError>;
    fn update_builder(
        &self,
        id: BuilderId,
        fields: &BuilderFields,
    ) -> Result<HouseBuilder, StoreError>;
    fn delete_builder(&self, id: BuilderId) -> Result<(), StoreError>;
    fn fetch_builder(&self, id: BuilderId) -> Result<Option<HouseBuilder>, StoreError>;
    fn list_builders(&self) -> Result<Vec<HouseBuilder>, StoreError>;

    fn insert_house(&self, fields: &HouseFields) -> Result<House, StoreError>;
    fn update_house(&self, id: HouseId, fields: &HouseFields) -> Result<House, StoreError>;
    fn delete_house(&self, id: HouseId) -> Result<(), StoreError>;
    fn fetch_house(&self, id: HouseId) -> Result<Option<House>, StoreError>;
    fn list_houses(&self, builder: Option<BuilderId>) -> Result<Vec<House>, StoreError>;
}
