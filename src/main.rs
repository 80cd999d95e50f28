use std::fmt::Display;
use std::io;
use std::net::TcpListener;
use std::sync::Arc;

use tracing::{info, warn};

use birthday_greeter::configuration::{get_static_configuration, StoreBackend};
use birthday_greeter::messaging::TwilioGateway;
use birthday_greeter::scheduler::BirthdayScheduler;
use birthday_greeter::store::{InMemoryContactStore, MongoContactStore};
use birthday_greeter::telemetry::{get_subscriber, init_subscriber};
use birthday_greeter::{get_database_connection, run, SharedStore};

fn startup_error(context: &str, error: impl Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, error))
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let subscriber = get_subscriber("birthday-greeter".into(), "info".into(), io::stdout);
    init_subscriber(subscriber).map_err(|error| startup_error("failed to set up logging", error))?;

    let configuration = get_static_configuration()
        .map_err(|error| startup_error("failed to load configuration", error))?;
    let send_at = configuration
        .scheduler
        .send_at_time()
        .map_err(|error| startup_error("invalid scheduler configuration", error))?;

    let store: SharedStore = match configuration.store.backend {
        StoreBackend::Mongo => {
            let database = get_database_connection(configuration.database)
                .await
                .map_err(|error| startup_error("failed to configure mongodb", error))?;
            info!(database = %database.name(), "using mongodb contact store");
            Arc::new(MongoContactStore::new(&database))
        }
        StoreBackend::Memory => {
            warn!("using the in-memory contact store, contacts are lost on restart");
            Arc::new(InMemoryContactStore::new())
        }
    };

    if configuration.scheduler.enabled {
        let gateway = TwilioGateway::new(&configuration.messaging)
            .map_err(|error| startup_error("failed to build the SMS client", error))?;
        let scheduler = BirthdayScheduler::new(store.clone(), Arc::new(gateway), send_at);
        tokio::spawn(scheduler.run_forever());
        info!(%send_at, "birthday scheduler started");
    } else {
        info!("birthday scheduler disabled");
    }

    let listener = TcpListener::bind((
        configuration.application_host.as_str(),
        configuration.application_port,
    ))?;
    info!("Server running on port {}", configuration.application_port);

    run(listener, store).await
}
