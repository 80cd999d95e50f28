use std::iter::once;
use std::net::TcpListener;

use axum::extract::Request;
use axum::http::header;
use axum::routing::get;
use axum::Router;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use crate::configuration::DatabaseConfiguration;
use crate::handlers::{
    create_contact, delete_contact, get_contact, health_check, list_contacts, update_contact,
};

pub use handlers::SharedStore;

pub mod configuration;
pub mod error;
pub mod handlers;
pub mod messaging;
pub mod scheduler;
pub mod store;
pub mod structs;
pub mod telemetry;

pub async fn run(listener: TcpListener, store: SharedStore) -> Result<(), std::io::Error> {
    listener.set_nonblocking(true)?;
    let listener = tokio::net::TcpListener::from_std(listener)?;
    axum::serve(listener, app(store)).await
}

pub async fn get_database_connection(
    database_config: DatabaseConfiguration,
) -> Result<Database, mongodb::error::Error> {
    let client_options = ClientOptions::parse(database_config.connection_string()).await?;
    let client = Client::with_options(client_options)?;
    Ok(client.database(&database_config.database_name))
}

pub fn app(store: SharedStore) -> Router {
    let contacts = Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        );

    Router::new()
        .route("/health-check", get(health_check))
        .nest("/api", contacts)
        .with_state(store)
        .layer(
            ServiceBuilder::new()
                .layer(SetSensitiveRequestHeadersLayer::new(once(header::AUTHORIZATION)))
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or_default();
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
