use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use serde_json::{json, Value};

use birthday_greeter::scheduler::{BirthdayScheduler, Outcome};

use crate::helpers::{spawn_app, RecordingGateway, TestApp};

fn nine_am() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

fn local(year: i32, month: u32, day: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, 9, 0, 0)
        .single()
        .expect("unambiguous local time")
}

async fn create(app: &TestApp, name: &str, phone: &str, birthday: &str) -> Value {
    app.post_contact(&json!({"name": name, "phone": phone, "birthday": birthday}))
        .await
        .json::<Value>()
        .await
        .unwrap()
}

async fn fetch(app: &TestApp, id: &Value) -> Value {
    app.client
        .get(app.contact_url(id.as_str().unwrap()))
        .send()
        .await
        .expect("failed request")
        .json::<Value>()
        .await
        .unwrap()
}

#[tokio::test]
async fn greets_a_contact_on_their_birthday() {
    let app = spawn_app().await;
    let ana = create(&app, "Ana", "+15551234567", "1995-03-10").await;
    let gateway = Arc::new(RecordingGateway::default());
    let scheduler = BirthdayScheduler::new(app.store.clone(), gateway.clone(), nine_am());
    let triggered_at = local(1995, 3, 10);

    let report = scheduler.run_at(triggered_at).await;

    assert_eq!(report.sent(), 1);
    let sent = gateway.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "+15551234567");
    assert!(sent[0].1.contains("Ana"));

    let stored = fetch(&app, &ana["id"]).await;
    let last_sent: DateTime<Utc> = serde_json::from_value(stored["lastSent"].clone())
        .expect("lastSent is a timestamp");
    assert!(last_sent >= triggered_at.with_timezone(&Utc));
}

#[tokio::test]
async fn one_failed_delivery_does_not_block_the_others() {
    let app = spawn_app().await;
    let unreachable = create(&app, "Bruno", "+15550000000", "1990-05-01").await;
    let reachable = create(&app, "Carla", "+15551111111", "2000-05-01").await;
    create(&app, "Dora", "+15552222222", "1990-05-02").await;
    let gateway = Arc::new(RecordingGateway::failing_for("+15550000000"));
    let scheduler = BirthdayScheduler::new(app.store.clone(), gateway.clone(), nine_am());

    let report = scheduler.run_at(local(2024, 5, 1)).await;

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.sent(), 1);
    assert_eq!(report.failed(), 1);
    assert!(report
        .outcomes
        .iter()
        .any(|outcome| matches!(outcome.outcome, Outcome::Failed { .. })));
    assert_eq!(
        gateway.sent(),
        vec![(String::from("+15551111111"), String::from("Happy Birthday, Carla!"))]
    );
    assert!(fetch(&app, &unreachable["id"]).await.get("lastSent").is_none());
    assert!(fetch(&app, &reachable["id"]).await["lastSent"].is_string());
}

#[tokio::test]
async fn rerunning_on_the_same_day_sends_nothing_new() {
    let app = spawn_app().await;
    create(&app, "Ana", "+15551234567", "1995-03-10").await;
    let gateway = Arc::new(RecordingGateway::default());
    let scheduler = BirthdayScheduler::new(app.store.clone(), gateway.clone(), nine_am());

    scheduler.run_at(local(2025, 3, 10)).await;
    let rerun = scheduler.run_at(local(2025, 3, 10)).await;

    assert_eq!(rerun.skipped(), 1);
    assert_eq!(gateway.sent().len(), 1);
}

#[tokio::test]
async fn nobody_is_greeted_on_an_empty_day() {
    let app = spawn_app().await;
    create(&app, "Ana", "+15551234567", "1995-03-10").await;
    let gateway = Arc::new(RecordingGateway::default());
    let scheduler = BirthdayScheduler::new(app.store.clone(), gateway.clone(), nine_am());

    let report = scheduler.run_at(local(2025, 3, 11)).await;

    assert!(report.outcomes.is_empty());
    assert!(gateway.sent().is_empty());
}
