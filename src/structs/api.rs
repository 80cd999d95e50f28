use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::contact::{parse_birthday, Contact, ContactFields, NewContact};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Name, Phone, and Birthday are required.";
pub const INVALID_BIRTHDAY_MESSAGE: &str = "Invalid Birthday format. Please use ISO 8601.";

/// Every field is optional on the wire so that missing input is reported as a
/// validation failure instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CreateContactBody {
    pub name: Option<String>,
    #[serde(alias = "phoneNumber")]
    pub phone: Option<String>,
    pub birthday: Option<String>,
    #[serde(rename = "keyWords", skip_serializing_if = "Option::is_none")]
    pub key_words: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpdateContactBody {
    pub name: Option<String>,
    #[serde(rename = "phoneNumber", alias = "phone")]
    pub phone_number: Option<String>,
    pub birthday: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactBody {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sent: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_words: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        MessageBody {
            message: message.into(),
        }
    }
}

impl From<Contact> for ContactBody {
    fn from(contact: Contact) -> Self {
        ContactBody {
            id: contact.id,
            name: contact.name,
            phone_number: contact.phone_number,
            birthday: contact.birthday,
            last_sent: contact.last_sent,
            key_words: contact.key_words,
        }
    }
}

impl CreateContactBody {
    pub fn validate(self) -> Result<NewContact, &'static str> {
        let (name, phone_number, birthday) =
            required_fields(self.name, self.phone, self.birthday)?;
        Ok(NewContact {
            name,
            phone_number,
            birthday,
            key_words: self.key_words.filter(|key_words| !key_words.trim().is_empty()),
        })
    }
}

impl UpdateContactBody {
    pub fn validate(self) -> Result<ContactFields, &'static str> {
        let (name, phone_number, birthday) =
            required_fields(self.name, self.phone_number, self.birthday)?;
        Ok(ContactFields {
            name,
            phone_number,
            birthday,
        })
    }
}

fn required_fields(
    name: Option<String>,
    phone_number: Option<String>,
    birthday: Option<String>,
) -> Result<(String, String, NaiveDate), &'static str> {
    let name = present(name).ok_or(REQUIRED_FIELDS_MESSAGE)?;
    let phone_number = present(phone_number).ok_or(REQUIRED_FIELDS_MESSAGE)?;
    let birthday = present(birthday).ok_or(REQUIRED_FIELDS_MESSAGE)?;
    let birthday = parse_birthday(&birthday).ok_or(INVALID_BIRTHDAY_MESSAGE)?;
    Ok((name, phone_number, birthday))
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
