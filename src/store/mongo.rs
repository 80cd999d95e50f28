use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, Document, Regex};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContactStore, StoreError};
use crate::structs::contact::{is_leap_day_fallback, Contact, ContactFields, NewContact};

const COLLECTION_NAME: &str = "contacts";

/// Document layout of the `contacts` collection. Birthdays are stored as
/// `YYYY-MM-DD` strings so the month and day can be matched with a suffix
/// regex.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct ContactDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    name: String,
    phone_number: String,
    birthday: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_sent: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_words: Option<String>,
}

impl From<ContactDocument> for Contact {
    fn from(document: ContactDocument) -> Self {
        Contact {
            id: document.id.to_uuid_1(),
            name: document.name,
            phone_number: document.phone_number,
            birthday: document.birthday,
            last_sent: document.last_sent,
            key_words: document.key_words,
        }
    }
}

impl From<&Contact> for ContactDocument {
    fn from(contact: &Contact) -> Self {
        ContactDocument {
            id: bson::Uuid::from_uuid_1(contact.id),
            name: contact.name.clone(),
            phone_number: contact.phone_number.clone(),
            birthday: contact.birthday,
            last_sent: contact.last_sent,
            key_words: contact.key_words.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MongoContactStore {
    contacts: Collection<ContactDocument>,
}

impl MongoContactStore {
    pub fn new(database: &Database) -> Self {
        MongoContactStore {
            contacts: database.collection(COLLECTION_NAME),
        }
    }
}

fn by_id(id: Uuid) -> Document {
    doc! { "_id": bson::Uuid::from_uuid_1(id) }
}

/// Filter on the stored `YYYY-MM-DD` string that ignores the year.
fn birthday_filter(date: NaiveDate) -> Document {
    let pattern = if is_leap_day_fallback(date) {
        String::from("-02-(28|29)$")
    } else {
        format!("-{:02}-{:02}$", date.month(), date.day())
    };
    doc! {
        "birthday": Regex {
            pattern,
            options: String::new(),
        }
    }
}

#[async_trait]
impl ContactStore for MongoContactStore {
    #[tracing::instrument(name = "Insert contact", skip(self))]
    async fn create(&self, new_contact: NewContact) -> Result<Contact, StoreError> {
        let contact = Contact::from_new(Uuid::new_v4(), new_contact);
        self.contacts
            .insert_one(ContactDocument::from(&contact), None)
            .await?;
        Ok(contact)
    }

    #[tracing::instrument(name = "Fetch contact by id", skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Contact>, StoreError> {
        let found = self.contacts.find_one(by_id(id), None).await?;
        Ok(found.map(Contact::from))
    }

    #[tracing::instrument(name = "Fetch all contacts", skip(self))]
    async fn list_all(&self) -> Result<Vec<Contact>, StoreError> {
        let cursor = self.contacts.find(None, None).await?;
        let documents: Vec<ContactDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Contact::from).collect())
    }

    #[tracing::instrument(name = "Update contact", skip(self))]
    async fn update_by_id(
        &self,
        id: Uuid,
        fields: ContactFields,
    ) -> Result<Option<Contact>, StoreError> {
        let update = doc! {
            "$set": {
                "name": fields.name,
                "phone_number": fields.phone_number,
                "birthday": bson::to_bson(&fields.birthday)?,
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .contacts
            .find_one_and_update(by_id(id), update, options)
            .await?;
        Ok(updated.map(Contact::from))
    }

    #[tracing::instrument(name = "Delete contact", skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = self.contacts.delete_one(by_id(id), None).await?;
        Ok(result.deleted_count > 0)
    }

    #[tracing::instrument(name = "Find contacts by birthday", skip(self))]
    async fn find_by_birthday(&self, date: NaiveDate) -> Result<Vec<Contact>, StoreError> {
        let cursor = self.contacts.find(birthday_filter(date), None).await?;
        let documents: Vec<ContactDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Contact::from).collect())
    }

    #[tracing::instrument(name = "Record birthday message", skip(self))]
    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> Result<bool, StoreError> {
        let update = doc! { "$set": { "last_sent": bson::to_bson(&sent_at)? } };
        let result = self.contacts.update_one(by_id(id), update, None).await?;
        Ok(result.matched_count > 0)
    }
}
