use super::domain::{Lead, LeadId, LeadKind, NewLead};
use crate::storage::StoreError;

/// Lead storage. Waitlist emails are unique among waitlist leads.
pub trait LeadRepository: Send + Sync {
    fn insert(&self, lead: &NewLead) -> Result<Lead, StoreError>;
    fn delete(&self, id: LeadId) -> Result<(), StoreError>;
    fn fetch(&self, id: LeadId) -> Result<Option<Lead>, StoreError>;
    /// Newest first, optionally restricted to one kind.
    fn list(&self, kind: Option<LeadKind>) -> Result<Vec<Lead>, StoreError>;
    fn waitlist_contains(&self, email: &str) -> Result<bool, StoreError>;
}
