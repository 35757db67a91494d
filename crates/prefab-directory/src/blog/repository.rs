use super::domain::{BlogPost, PostFields, PostId};
use crate::storage::StoreError;

pub trait BlogRepository: Send + Sync {
    fn insert(&self, fields: &PostFields) -> Result<BlogPost, StoreError>;
    fn update(&self, id: PostId, fields: &PostFields) -> Result<BlogPost, StoreError>;
    fn delete(&self, id: PostId) -> Result<(), StoreError>;
    fn fetch(&self, id: PostId) -> Result<Option<BlogPost>, StoreError>;
    fn fetch_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StoreError>;
    /// Every post, drafts included, newest first.
    fn list(&self) -> Result<Vec<BlogPost>, StoreError>;
}
