//! # API REST
//!
//! REST API implementation for EverVault.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON errors, CORS, release timers)
//!
//! Uses `api-shared` for wire types and `evervault-core` for all booking logic.

#![warn(rust_2018_idioms)]

mod error;
mod handlers;
mod release;

pub use error::{ApiError, ApiResult};
pub use release::schedule_release;

use api_shared::{
    BookingRes, ConfirmBookingReq, CreateBookingReq, EquipmentRes, ErrorRes, HealthRes,
    SetStatusReq,
};
use axum::{
    routing::{get, post},
    Router,
};
use evervault_core::HospitalService;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    service: HospitalService,
}

impl AppState {
    pub fn new(service: HospitalService) -> Self {
        Self { service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_equipment,
        handlers::get_equipment,
        handlers::set_equipment_status,
        handlers::get_queue,
        handlers::peek_queue,
        handlers::call_next,
        handlers::list_pending,
        handlers::get_booking,
        handlers::create_booking,
        handlers::confirm_booking,
        handlers::finish_booking,
    ),
    components(schemas(
        HealthRes,
        EquipmentRes,
        BookingRes,
        CreateBookingReq,
        ConfirmBookingReq,
        SetStatusReq,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Build the REST router, Swagger UI included, over `service`.
pub fn router(service: HospitalService) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/equipment", get(handlers::list_equipment))
        .route("/api/equipment/:id", get(handlers::get_equipment))
        .route(
            "/api/equipment/:id/status",
            post(handlers::set_equipment_status),
        )
        .route("/api/queue/:equipment_id", get(handlers::get_queue))
        .route("/api/queue/:equipment_id/head", get(handlers::peek_queue))
        .route("/api/queue/:equipment_id/next", post(handlers::call_next))
        .route("/api/bookings", post(handlers::create_booking))
        .route("/api/bookings/pending", get(handlers::list_pending))
        .route("/api/bookings/:id", get(handlers::get_booking))
        .route("/api/bookings/:id/confirm", post(handlers::confirm_booking))
        .route("/api/bookings/:id/serve", post(handlers::finish_booking))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(service))
}
