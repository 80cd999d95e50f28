use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::structs::contact::{Contact, ContactFields, NewContact};

pub mod memory;
pub mod mongo;

pub use memory::InMemoryContactStore;
pub use mongo::MongoContactStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),

    #[error("contact could not be converted to or from BSON: {0}")]
    Encoding(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(error: mongodb::error::Error) -> Self {
        StoreError::Backend(error.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(error: mongodb::bson::ser::Error) -> Self {
        StoreError::Encoding(error.to_string())
    }
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Persist a new contact under a freshly generated id.
    async fn create(&self, new_contact: NewContact) -> Result<Contact, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Contact>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Contact>, StoreError>;

    /// Replace name, phone number and birthday. Returns the updated record, or
    /// `None` if no contact has this id.
    async fn update_by_id(
        &self,
        id: Uuid,
        fields: ContactFields,
    ) -> Result<Option<Contact>, StoreError>;

    /// Hard delete. Returns `false` if no contact has this id.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Contacts whose birthday falls on `date`, ignoring the year.
    async fn find_by_birthday(&self, date: NaiveDate) -> Result<Vec<Contact>, StoreError>;

    /// Record a delivered greeting. Only `last_sent` is written.
    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> Result<bool, StoreError>;
}
