use super::domain::{NewUser, User, UserChanges, UserId};
use crate::storage::StoreError;

/// Account storage. Emails are stored lowercased and are unique.
pub trait UserRepository: Send + Sync {
    fn insert(&self, user: &NewUser) -> Result<User, StoreError>;
    fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, StoreError>;
    fn delete(&self, id: UserId) -> Result<(), StoreError>;
    fn fetch(&self, id: UserId) -> Result<Option<User>, StoreError>;
    fn fetch_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    fn list(&self) -> Result<Vec<User>, StoreError>;
    fn count(&self) -> Result<usize, StoreError>;
}
