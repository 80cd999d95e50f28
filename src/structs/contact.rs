use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    pub last_sent: Option<DateTime<Utc>>,
    pub key_words: Option<String>,
}

/// Fields accepted when a contact is created. The store assigns the id.
#[derive(Clone, Debug, PartialEq)]
pub struct NewContact {
    pub name: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
    pub key_words: Option<String>,
}

/// The mutable fields an update replaces wholesale.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactFields {
    pub name: String,
    pub phone_number: String,
    pub birthday: NaiveDate,
}

impl Contact {
    pub fn from_new(id: Uuid, new_contact: NewContact) -> Self {
        Contact {
            id,
            name: new_contact.name,
            phone_number: new_contact.phone_number,
            birthday: new_contact.birthday,
            last_sent: None,
            key_words: new_contact.key_words,
        }
    }

    pub fn apply(&mut self, fields: ContactFields) {
        self.name = fields.name;
        self.phone_number = fields.phone_number;
        self.birthday = fields.birthday;
    }
}

/// Parses an ISO 8601 birthday: a plain date, an RFC 3339 timestamp or a
/// naive date-time. Only the calendar date is kept.
pub fn parse_birthday(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Some(timestamp.date_naive());
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|timestamp| timestamp.date())
}

/// Birthdays recur on month and day. A 29 February birthday is celebrated on
/// 28 February when the current year has no leap day.
pub fn birthday_matches(birthday: NaiveDate, today: NaiveDate) -> bool {
    if birthday.month() == today.month() && birthday.day() == today.day() {
        return true;
    }
    is_leap_day_fallback(today) && birthday.month() == 2 && birthday.day() == 29
}

/// True on 28 February of a year without a 29 February.
pub fn is_leap_day_fallback(today: NaiveDate) -> bool {
    today.month() == 2 && today.day() == 28 && NaiveDate::from_ymd_opt(today.year(), 2, 29).is_none()
}
