use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, Responder, ResponseError, delete, get, post, put, web};
use thiserror::Error;

use crate::app::services::{RecordStore, StoreError};
use crate::domain::models::EnergyRecordInput;
use crate::domain::validation::{ValidationError, validate};

#[derive(Clone)]
pub struct ApiState {
    pub records: Arc<dyn RecordStore>,
}

impl ApiState {
    pub fn new(records: impl RecordStore + 'static) -> Self {
        Self {
            records: Arc::new(records),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid param id")]
    InvalidId,
    #[error("invalid input: {0}")]
    MalformedInput(#[source] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId | ApiError::MalformedInput(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "record store failure");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        HttpResponse::build(status)
            .insert_header(header::ContentType::plaintext())
            .body(format!("{self}\n"))
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(list_records_endpoint)
        .service(add_record_endpoint)
        .service(get_record_endpoint)
        .service(update_record_endpoint)
        .service(delete_record_endpoint);
}

pub fn cors_policy(allowed_origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(allowed_origin)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_header(header::CONTENT_TYPE)
        .supports_credentials()
}

fn parse_record_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| ApiError::InvalidId)
}

fn decode_input(body: &[u8]) -> Result<EnergyRecordInput, ApiError> {
    serde_json::from_slice(body).map_err(ApiError::MalformedInput)
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[get("/api/records")]
async fn list_records_endpoint(state: web::Data<ApiState>) -> Result<HttpResponse, ApiError> {
    let records = state.records.list()?;
    Ok(HttpResponse::Ok().json(records))
}

#[post("/api/records/add")]
async fn add_record_endpoint(
    state: web::Data<ApiState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input = decode_input(&body)?;
    validate(&input)?;

    let record = state.records.create(&input)?;
    tracing::info!(record_id = record.id, device = %record.device, "energy record created");

    Ok(HttpResponse::Created().json(record))
}

#[get("/api/records/{id}")]
async fn get_record_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_record_id(&path)?;
    let record = state.records.get_by_id(id)?;
    Ok(HttpResponse::Ok().json(record))
}

#[put("/api/records/{id}")]
async fn update_record_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let id = parse_record_id(&path)?;
    let input = decode_input(&body)?;
    validate(&input)?;

    let record = state.records.update(id, &input)?;
    tracing::info!(record_id = record.id, "energy record updated");

    Ok(HttpResponse::Ok().json(record))
}

#[delete("/api/records/{id}")]
async fn delete_record_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_record_id(&path)?;
    state.records.delete(id)?;
    tracing::info!(record_id = id, "energy record deleted");

    Ok(HttpResponse::NoContent().finish())
}
