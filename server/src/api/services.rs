//! Services CRUD, scoped to the authenticated account.
//!
//! The owner of every record is taken from the request's [`Identity`]. A
//! `user_id` in the request body is ignored.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;

use super::response::{Envelope, success};
use super::{ApiError, AppState, JsonBody};
use crate::auth::Identity;
use crate::store::{Service, ServiceDraft};

const NAME_REQUIRED: &str = "Field 'nome' is required";
const NOT_FOUND: &str = "Service not found";

/// Body of a create or update request.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceRequest {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "preco")]
    pub price: Option<f64>,
    #[serde(rename = "duracao_minutos")]
    pub duration_minutes: Option<u32>,
}

impl ServiceRequest {
    fn into_draft(self) -> Result<ServiceDraft, ApiError> {
        let name = self
            .name
            .filter(|name| !name.is_empty())
            .ok_or(ApiError::BadRequest(NAME_REQUIRED))?;
        Ok(ServiceDraft {
            name,
            description: self.description,
            price: self.price,
            duration_minutes: self.duration_minutes,
        })
    }
}

/// Routes mounted under `/api/servicos`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Envelope<Vec<Service>>>, ApiError> {
    let services = state
        .store
        .list_services(&identity.user_id)
        .map_err(|e| ApiError::internal("Failed to fetch services", &e))?;
    Ok(success(services, "Services retrieved"))
}

async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(request): JsonBody<ServiceRequest>,
) -> Result<Json<Envelope<Service>>, ApiError> {
    let draft = request.into_draft()?;
    let service = state
        .store
        .insert_service(&identity.user_id, draft)
        .map_err(|e| ApiError::internal("Failed to create service", &e))?;

    tracing::debug!(account_id = %identity.user_id, service_id = %service.id, "service created");
    Ok(success(service, "Service created"))
}

async fn show(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Service>>, ApiError> {
    let service = state
        .store
        .get_service(&identity.user_id, &id)
        .map_err(|e| ApiError::internal("Failed to fetch service", &e))?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(success(service, "Service retrieved"))
}

async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<ServiceRequest>,
) -> Result<Json<Envelope<Service>>, ApiError> {
    let draft = request.into_draft()?;
    let service = state
        .store
        .update_service(&identity.user_id, &id, draft)
        .map_err(|e| ApiError::internal("Failed to update service", &e))?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(success(service, "Service updated"))
}

async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Service>>, ApiError> {
    let service = state
        .store
        .delete_service(&identity.user_id, &id)
        .map_err(|e| ApiError::internal("Failed to delete service", &e))?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;

    tracing::debug!(account_id = %identity.user_id, service_id = %service.id, "service deleted");
    Ok(success(service, "Service deleted"))
}
