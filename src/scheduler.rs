use std::sync::Arc;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::messaging::MessagingGateway;
use crate::store::ContactStore;
use crate::structs::contact::Contact;

pub fn greeting(name: &str) -> String {
    format!("Happy Birthday, {}!", name)
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Sent { message_id: String },
    /// `last_sent` already falls on today.
    AlreadySent,
    Failed { reason: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContactOutcome {
    pub contact_id: Uuid,
    pub outcome: Outcome,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub date: NaiveDate,
    pub outcomes: Vec<ContactOutcome>,
    /// Set when today's contacts could not be looked up at all.
    pub query_error: Option<String>,
}

impl RunReport {
    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|contact| predicate(&contact.outcome))
            .count()
    }

    pub fn sent(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Sent { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::AlreadySent))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Failed { .. }))
    }
}

/// The first occurrence of `at` strictly after `now`.
pub fn next_trigger(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Places `trigger` in `zone`. A trigger inside a DST gap moves forward to the first
/// minute that exists on the wall clock.
pub fn resolve_trigger<Tz: TimeZone>(zone: &Tz, trigger: NaiveDateTime) -> Option<DateTime<Tz>> {
    (0..=24 * 60).find_map(|minutes| {
        zone.from_local_datetime(&(trigger + Duration::minutes(minutes)))
            .earliest()
    })
}

pub struct BirthdayScheduler {
    store: Arc<dyn ContactStore>,
    gateway: Arc<dyn MessagingGateway>,
    send_at: NaiveTime,
}

impl BirthdayScheduler {
    pub fn new(
        store: Arc<dyn ContactStore>,
        gateway: Arc<dyn MessagingGateway>,
        send_at: NaiveTime,
    ) -> Self {
        BirthdayScheduler {
            store,
            gateway,
            send_at,
        }
    }

    /// Sleeps until the configured time each day and runs the sweep. Never
    /// returns.
    pub async fn run_forever(self) {
        loop {
            let now = Local::now();
            let next = next_trigger(now.naive_local(), self.send_at);
            let next =
                resolve_trigger(&Local, next).unwrap_or_else(|| now + Duration::days(1));
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::info!(next_run = %next, "birthday sweep scheduled");
            tokio::time::sleep(wait).await;

            let report = self.run_at(Local::now()).await;
            tracing::info!(
                date = %report.date,
                sent = report.sent(),
                skipped = report.skipped(),
                failed = report.failed(),
                "birthday sweep finished"
            );
        }
    }

    /// One sweep for the calendar day of `now`. `now` is also the timestamp
    /// recorded as `last_sent`.
    #[tracing::instrument(name = "Birthday sweep", skip(self))]
    pub async fn run_at(&self, now: DateTime<Local>) -> RunReport {
        let today = now.date_naive();
        let mut report = RunReport {
            date: today,
            outcomes: Vec::new(),
            query_error: None,
        };

        let contacts = match self.store.find_by_birthday(today).await {
            Ok(contacts) => contacts,
            Err(error) => {
                tracing::error!(%error, "failed to look up today's birthdays");
                report.query_error = Some(error.to_string());
                return report;
            }
        };

        for contact in contacts {
            let outcome = self.greet(&contact, now).await;
            report.outcomes.push(ContactOutcome {
                contact_id: contact.id,
                outcome,
            });
        }
        report
    }

    async fn greet(&self, contact: &Contact, now: DateTime<Local>) -> Outcome {
        let today = now.date_naive();
        let sent_today = contact
            .last_sent
            .map(|sent| sent.with_timezone(&Local).date_naive() == today)
            .unwrap_or(false);
        if sent_today {
            tracing::info!(contact_id = %contact.id, "greeting already sent today");
            return Outcome::AlreadySent;
        }

        let message_id = match self
            .gateway
            .send(&contact.phone_number, &greeting(&contact.name))
            .await
        {
            Ok(message_id) => message_id,
            Err(error) => {
                tracing::error!(contact_id = %contact.id, %error, "failed to send greeting");
                return Outcome::Failed {
                    reason: error.to_string(),
                };
            }
        };

        let sent_at: DateTime<Utc> = now.with_timezone(&Utc);
        match self.store.mark_sent(contact.id, sent_at).await {
            Ok(true) => {
                tracing::info!(contact_id = %contact.id, %message_id, "greeting sent");
                Outcome::Sent { message_id }
            }
            Ok(false) => {
                tracing::warn!(contact_id = %contact.id, "contact deleted while greeting was sent");
                Outcome::Failed {
                    reason: String::from("contact no longer exists"),
                }
            }
            Err(error) => {
                tracing::error!(contact_id = %contact.id, %error, "failed to record greeting");
                Outcome::Failed {
                    reason: error.to_string(),
                }
            }
        }
    }
}
