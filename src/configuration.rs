use chrono::NaiveTime;

#[derive(serde::Deserialize)]
pub struct StaticConfiguration {
    pub application_host: String,
    pub application_port: u16,
    pub store: StoreConfiguration,
    pub database: DatabaseConfiguration,
    pub messaging: MessagingConfiguration,
    pub scheduler: SchedulerConfiguration,
}

#[derive(serde::Deserialize)]
pub struct StoreConfiguration {
    pub backend: StoreBackend,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(serde::Deserialize)]
pub struct DatabaseConfiguration {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

#[derive(serde::Deserialize)]
pub struct MessagingConfiguration {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(serde::Deserialize)]
pub struct SchedulerConfiguration {
    pub enabled: bool,
    /// Local wall-clock time of the daily run, `HH:MM`.
    pub send_at: String,
}

impl DatabaseConfiguration {
    pub fn connection_string(&self) -> String {
        if self.username.is_empty() {
            return format!("mongodb://{}:{}", self.host, self.port);
        }
        format!(
            "mongodb://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

impl SchedulerConfiguration {
    pub fn send_at_time(&self) -> Result<NaiveTime, config::ConfigError> {
        NaiveTime::parse_from_str(self.send_at.trim(), "%H:%M").map_err(|error| {
            config::ConfigError::Message(format!(
                "scheduler.send_at must be HH:MM, got {:?}: {}",
                self.send_at, error
            ))
        })
    }
}

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

fn builder_with_defaults() -> Result<Builder, config::ConfigError> {
    config::Config::builder()
        .set_default("application_host", "0.0.0.0")?
        .set_default("application_port", 5000)?
        .set_default("store.backend", "mongo")?
        .set_default("database.username", "")?
        .set_default("database.password", "")?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 27017)?
        .set_default("database.database_name", "birthdays")?
        .set_default("messaging.account_sid", "")?
        .set_default("messaging.auth_token", "")?
        .set_default("messaging.from_number", "")?
        .set_default("messaging.base_url", "https://api.twilio.com")?
        .set_default("messaging.timeout_seconds", 10)?
        .set_default("scheduler.enabled", true)?
        .set_default("scheduler.send_at", "09:00")
}

/// Reads `configuration.yaml` from the working directory when present, then
/// `APP_`-prefixed environment variables (`APP_DATABASE__HOST=...`).
pub fn get_static_configuration() -> Result<StaticConfiguration, config::ConfigError> {
    let settings = builder_with_defaults()?
        .add_source(
            config::File::new("configuration.yaml", config::FileFormat::Yaml).required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<StaticConfiguration>()
}
