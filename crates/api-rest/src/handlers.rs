use crate::error::{ApiError, ApiResult};
use crate::release::schedule_release;
use crate::AppState;
use api_shared::{
    BookingRes, ConfirmBookingReq, CreateBookingReq, EquipmentRes, ErrorRes, HealthRes,
    HealthService, PendingQuery, SetStatusReq,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use evervault_core::{BookingId, Dispatch, EquipmentId, EquipmentStatus, Priority};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
pub(crate) async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/equipment",
    responses(
        (status = 200, description = "All equipment units with queue length and next slot", body = [EquipmentRes])
    )
)]
/// List every equipment unit in id order.
#[axum::debug_handler]
pub(crate) async fn list_equipment(State(state): State<AppState>) -> Json<Vec<EquipmentRes>> {
    let equipment = state
        .service
        .equipment_overview()
        .into_iter()
        .map(EquipmentRes::from)
        .collect();
    Json(equipment)
}

#[utoipa::path(
    get,
    path = "/api/equipment/{id}",
    params(("id" = u64, Path, description = "Equipment id")),
    responses(
        (status = 200, description = "Equipment unit", body = EquipmentRes),
        (status = 404, description = "Unknown equipment", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_equipment(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<EquipmentRes>> {
    let Path(id) = path?;
    let view = state.service.equipment(EquipmentId::new(id))?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    post,
    path = "/api/equipment/{id}/status",
    params(("id" = u64, Path, description = "Equipment id")),
    request_body = SetStatusReq,
    responses(
        (status = 200, description = "Status changed", body = EquipmentRes),
        (status = 400, description = "Unknown status or IN_USE requested", body = ErrorRes),
        (status = 404, description = "Unknown equipment", body = ErrorRes)
    )
)]
/// Take a unit out of service or put it back.
#[axum::debug_handler]
pub(crate) async fn set_equipment_status(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<SetStatusReq>, JsonRejection>,
) -> ApiResult<Json<EquipmentRes>> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let status: EquipmentStatus = req
        .status
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("status: {e}")))?;

    let view = state.service.set_status(EquipmentId::new(id), status)?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    get,
    path = "/api/queue/{equipment_id}",
    params(("equipment_id" = u64, Path, description = "Equipment id")),
    responses(
        (status = 200, description = "Queued bookings, next patient first", body = [BookingRes]),
        (status = 404, description = "Unknown equipment", body = ErrorRes)
    )
)]
/// Operational queue of one unit, ordered by assigned priority and then triage order.
#[axum::debug_handler]
pub(crate) async fn get_queue(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Vec<BookingRes>>> {
    let Path(equipment_id) = path?;
    let queue = state.service.queue(EquipmentId::new(equipment_id))?;
    Ok(Json(queue.into_iter().map(BookingRes::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/queue/{equipment_id}/head",
    params(("equipment_id" = u64, Path, description = "Equipment id")),
    responses(
        (status = 200, description = "Next patient, or null when nobody is queued", body = BookingRes),
        (status = 404, description = "Unknown equipment", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn peek_queue(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<Option<BookingRes>>> {
    let Path(equipment_id) = path?;
    let head = state.service.peek_next(EquipmentId::new(equipment_id))?;
    Ok(Json(head.map(BookingRes::from)))
}

#[utoipa::path(
    post,
    path = "/api/queue/{equipment_id}/next",
    params(("equipment_id" = u64, Path, description = "Equipment id")),
    responses(
        (status = 200, description = "Patient called in; the unit is now IN_USE", body = BookingRes),
        (status = 404, description = "Unknown equipment", body = ErrorRes),
        (status = 409, description = "Queue empty (EMPTY_QUEUE) or unit under maintenance", body = ErrorRes)
    )
)]
/// Call the next patient for a unit.
///
/// The served booking is returned. Unless the release policy is manual, a timer returns the unit
/// to service once the procedure should be over.
#[axum::debug_handler]
pub(crate) async fn call_next(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<BookingRes>> {
    let Path(equipment_id) = path?;
    let equipment_id = EquipmentId::new(equipment_id);
    match state.service.call_next(equipment_id)? {
        Dispatch::Served { booking, equipment } => {
            schedule_release(&state.service, &equipment, booking.id);
            Ok(Json(booking.into()))
        }
        Dispatch::Empty => Err(ApiError::EmptyQueue(equipment_id)),
    }
}

#[utoipa::path(
    get,
    path = "/api/bookings/pending",
    params(PendingQuery),
    responses(
        (status = 200, description = "Bookings awaiting triage, oldest first", body = [BookingRes]),
        (status = 400, description = "Malformed equipmentId", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn list_pending(
    State(state): State<AppState>,
    query: Result<Query<PendingQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<BookingRes>>> {
    let Query(query) = query?;
    let pending = state
        .service
        .pending(query.equipment_id.map(EquipmentId::new));
    Ok(Json(pending.into_iter().map(BookingRes::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(("id" = u64, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking in any state", body = BookingRes),
        (status = 404, description = "Unknown booking", body = ErrorRes)
    )
)]
#[axum::debug_handler]
pub(crate) async fn get_booking(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<BookingRes>> {
    let Path(id) = path?;
    let booking = state.service.booking(BookingId::new(id))?;
    Ok(Json(booking.into()))
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingReq,
    responses(
        (status = 201, description = "Booking created as PENDING", body = BookingRes),
        (status = 400, description = "Blank name, unknown equipment, malformed or past slot time", body = ErrorRes),
        (status = 409, description = "Equipment under maintenance", body = ErrorRes)
    )
)]
/// Submit a patient's booking request.
///
/// Unknown `requestedPriority` values are treated as `NORMAL`; triage decides the real priority.
#[axum::debug_handler]
pub(crate) async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookingReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BookingRes>)> {
    let Json(req) = payload?;
    let booking = state.service.submit_booking(req.into())?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

#[utoipa::path(
    post,
    path = "/api/bookings/{id}/confirm",
    params(("id" = u64, Path, description = "Booking id")),
    request_body = ConfirmBookingReq,
    responses(
        (status = 200, description = "Booking triaged and QUEUED", body = BookingRes),
        (status = 400, description = "Unknown priority", body = ErrorRes),
        (status = 404, description = "Unknown booking", body = ErrorRes),
        (status = 409, description = "Booking is not PENDING", body = ErrorRes)
    )
)]
/// Triage a pending booking with its authoritative priority.
#[axum::debug_handler]
pub(crate) async fn confirm_booking(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ConfirmBookingReq>, JsonRejection>,
) -> ApiResult<Json<BookingRes>> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let assigned: Priority = req
        .assigned_priority
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("assignedPriority: {e}")))?;

    let booking = state.service.approve(BookingId::new(id), assigned)?;
    Ok(Json(booking.into()))
}

#[utoipa::path(
    post,
    path = "/api/bookings/{id}/serve",
    params(("id" = u64, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Procedure finished; unit state afterwards", body = EquipmentRes),
        (status = 404, description = "Unknown booking", body = ErrorRes),
        (status = 409, description = "Booking has not been called in", body = ErrorRes)
    )
)]
/// Mark the procedure of a served booking as finished and free its unit.
#[axum::debug_handler]
pub(crate) async fn finish_booking(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<EquipmentRes>> {
    let Path(id) = path?;
    let view = state.service.release(BookingId::new(id))?;
    Ok(Json(view.into()))
}
