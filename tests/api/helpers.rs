use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use mongodb::Database;
use serde_json::Value;

use birthday_greeter::configuration::get_static_configuration;
use birthday_greeter::messaging::{DeliveryError, MessagingGateway};
use birthday_greeter::store::InMemoryContactStore;
use birthday_greeter::telemetry::{get_subscriber, init_subscriber};
use birthday_greeter::{get_database_connection, SharedStore};

static TRACING: Once = Once::new();

/// Logs are discarded unless `TEST_LOG` is set.
fn init_tracing() {
    TRACING.call_once(|| {
        if std::env::var("TEST_LOG").is_ok() {
            let subscriber = get_subscriber("test".into(), "debug".into(), std::io::stdout);
            let _ = init_subscriber(subscriber);
        } else {
            let subscriber = get_subscriber("test".into(), "debug".into(), std::io::sink);
            let _ = init_subscriber(subscriber);
        }
    });
}

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryContactStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn post_contact(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/contacts", self.address))
            .json(body)
            .send()
            .await
            .expect("failed request")
    }

    pub async fn list_contacts(&self) -> Vec<Value> {
        self.client
            .get(format!("{}/api/contacts", self.address))
            .send()
            .await
            .expect("failed request")
            .json()
            .await
            .expect("a JSON array")
    }

    pub fn contact_url(&self, id: &str) -> String {
        format!("{}/api/contacts/{}", self.address, id)
    }
}

pub async fn spawn_app() -> TestApp {
    let store = Arc::new(InMemoryContactStore::new());
    let address = spawn_server(store.clone());
    TestApp {
        address,
        store,
        client: reqwest::Client::new(),
    }
}

pub fn spawn_server(store: SharedStore) -> String {
    init_tracing();
    let test_address = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
    let test_listener = TcpListener::bind(test_address).expect("failed to bind random port");
    let local_address = test_listener.local_addr().unwrap();

    tokio::spawn(birthday_greeter::run(test_listener, store));
    format!("http://{}", local_address)
}

pub async fn get_test_database() -> Result<Database, mongodb::error::Error> {
    let mut test_config = get_static_configuration().expect("failed to load configs");
    let test_database_name = format!("test-{}", &ulid::Ulid::new().to_string());
    test_config.database.database_name = test_database_name;

    get_database_connection(test_config.database).await
}

/// Stand-in for the SMS provider that records every message.
#[derive(Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<(String, String)>>,
    pub failing_numbers: Vec<String>,
}

impl RecordingGateway {
    pub fn failing_for(number: &str) -> Self {
        RecordingGateway {
            failing_numbers: vec![number.to_string()],
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send(&self, to: &str, body: &str) -> Result<String, DeliveryError> {
        if self.failing_numbers.iter().any(|number| number == to) {
            return Err(DeliveryError {
                to: to.to_string(),
                reason: String::from("unreachable number"),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((to.to_string(), body.to_string()));
        Ok(format!("SM{:032}", sent.len()))
    }
}
