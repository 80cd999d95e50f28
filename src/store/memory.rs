use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContactStore, StoreError};
use crate::structs::contact::{birthday_matches, Contact, ContactFields, NewContact};

/// Process-local store. Used when no database is configured and by tests.
#[derive(Debug, Default)]
pub struct InMemoryContactStore {
    contacts: RwLock<HashMap<Uuid, Contact>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn create(&self, new_contact: NewContact) -> Result<Contact, StoreError> {
        let mut contacts = self.contacts.write().await;
        let mut id = Uuid::new_v4();
        while contacts.contains_key(&id) {
            id = Uuid::new_v4();
        }
        let contact = Contact::from_new(id, new_contact);
        contacts.insert(id, contact.clone());
        Ok(contact)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Contact>, StoreError> {
        Ok(self.contacts.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self.contacts.read().await.values().cloned().collect())
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        fields: ContactFields,
    ) -> Result<Option<Contact>, StoreError> {
        let mut contacts = self.contacts.write().await;
        Ok(contacts.get_mut(&id).map(|contact| {
            contact.apply(fields);
            contact.clone()
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.contacts.write().await.remove(&id).is_some())
    }

    async fn find_by_birthday(&self, date: NaiveDate) -> Result<Vec<Contact>, StoreError> {
        Ok(self
            .contacts
            .read()
            .await
            .values()
            .filter(|contact| birthday_matches(contact.birthday, date))
            .cloned()
            .collect())
    }

    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut contacts = self.contacts.write().await;
        match contacts.get_mut(&id) {
            Some(contact) => {
                contact.last_sent = Some(sent_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
