use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::error::{ApiError, CONTACT_ID_REQUIRED_MESSAGE};
use crate::store::ContactStore;
use crate::structs::api::{
    ContactBody, CreateContactBody, MessageBody, UpdateContactBody, REQUIRED_FIELDS_MESSAGE,
};

pub type SharedStore = Arc<dyn ContactStore>;

fn contact_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|_| ApiError::validation(CONTACT_ID_REQUIRED_MESSAGE))
}

/// Malformed JSON is treated like missing fields.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(body)| body)
        .map_err(|_| ApiError::validation(REQUIRED_FIELDS_MESSAGE))
}

pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

#[tracing::instrument(name = "Create contact", skip(store, body))]
pub async fn create_contact(
    State(store): State<SharedStore>,
    body: Result<Json<CreateContactBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let new_contact = json_body(body)?
        .validate()
        .map_err(ApiError::validation)?;

    let contact = store
        .create(new_contact)
        .await
        .map_err(ApiError::store("Error creating contact"))?;
    tracing::info!(contact_id = %contact.id, "contact created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/contacts/{}", contact.id))],
        Json(ContactBody::from(contact)),
    ))
}

#[tracing::instrument(name = "List contacts", skip(store))]
pub async fn list_contacts(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<ContactBody>>, ApiError> {
    let contacts = store
        .list_all()
        .await
        .map_err(ApiError::store("Failed to retrieve contacts"))?;
    Ok(Json(contacts.into_iter().map(ContactBody::from).collect()))
}

#[tracing::instrument(name = "Get contact", skip(store))]
pub async fn get_contact(
    State(store): State<SharedStore>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ContactBody>, ApiError> {
    let id = contact_id(id)?;
    store
        .get_by_id(id)
        .await
        .map_err(ApiError::store("Failed to get contact"))?
        .map(|contact| Json(ContactBody::from(contact)))
        .ok_or(ApiError::NotFound)
}

#[tracing::instrument(name = "Update contact", skip(store, body))]
pub async fn update_contact(
    State(store): State<SharedStore>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateContactBody>, JsonRejection>,
) -> Result<Json<ContactBody>, ApiError> {
    let id = contact_id(id)?;
    let fields = json_body(body)?
        .validate()
        .map_err(ApiError::validation)?;

    store
        .update_by_id(id, fields)
        .await
        .map_err(ApiError::store("Failed to update contact"))?
        .map(|contact| Json(ContactBody::from(contact)))
        .ok_or(ApiError::NotFound)
}

#[tracing::instrument(name = "Delete contact", skip(store))]
pub async fn delete_contact(
    State(store): State<SharedStore>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = contact_id(id)?;
    let deleted = store
        .delete_by_id(id)
        .await
        .map_err(ApiError::store("Failed to delete contact"))?;

    if !deleted {
        return Err(ApiError::NotFound);
    }
    Ok(Json(MessageBody::new("Contact deleted successfully")))
}
