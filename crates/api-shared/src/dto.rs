//! JSON wire types.
//!
//! Field names are camelCase on the wire. Enumerations travel as their SCREAMING_SNAKE_CASE names
//! and timestamps as RFC 3339 strings; slot times keep the local `YYYY-MM-DDTHH:MM[:SS]` form the
//! booking form submits.

use evervault_core::validation::format_slot_time;
use evervault_core::{BookingError, BookingRequest, BookingSubmission, EquipmentId, EquipmentView};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// An equipment unit with its derived queue information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRes {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "MRI-1")]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "MRI")]
    pub kind: String,
    /// `AVAILABLE`, `IN_USE`, `MAINTENANCE` or `UNKNOWN`.
    #[schema(example = "AVAILABLE")]
    pub status: String,
    /// Procedure duration in minutes.
    #[schema(example = 60)]
    pub buffer_time: u32,
    pub queue_length: usize,
    /// `Now`, `Under Repair`, `Unknown` or a local `HH:MM`.
    #[schema(example = "Now")]
    pub next_available: String,
    pub current_booking_id: Option<u64>,
    pub busy_until: Option<String>,
}

impl From<EquipmentView> for EquipmentRes {
    fn from(view: EquipmentView) -> Self {
        let EquipmentView {
            equipment,
            queue_length,
            next_available,
        } = view;
        Self {
            id: equipment.id.get(),
            name: equipment.name.into_inner(),
            kind: equipment.kind.into_inner(),
            status: equipment.status.as_str().to_owned(),
            buffer_time: equipment.buffer_time,
            queue_length,
            next_available,
            current_booking_id: equipment.current_booking.map(|id| id.get()),
            busy_until: equipment.busy_until.map(|t| t.to_rfc3339()),
        }
    }
}

/// A booking request in any state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRes {
    pub id: u64,
    pub patient_name: String,
    pub equipment_id: u64,
    #[schema(example = "URGENT")]
    pub requested_priority: String,
    pub assigned_priority: Option<String>,
    /// The assigned priority once triaged, otherwise the requested one.
    pub priority: String,
    #[schema(example = "2026-02-14T10:30")]
    pub slot_time: Option<String>,
    /// `PENDING`, `QUEUED` or `SERVED`.
    pub state: String,
    pub created_at: String,
    pub queued_at: Option<String>,
    pub served_at: Option<String>,
}

impl From<BookingRequest> for BookingRes {
    fn from(booking: BookingRequest) -> Self {
        Self {
            id: booking.id.get(),
            priority: booking.effective_priority().as_str().to_owned(),
            patient_name: booking.patient_name.into_inner(),
            equipment_id: booking.equipment_id.get(),
            requested_priority: booking.requested_priority.as_str().to_owned(),
            assigned_priority: booking.assigned_priority.map(|p| p.as_str().to_owned()),
            slot_time: booking.slot_time.map(format_slot_time),
            state: booking.state.as_str().to_owned(),
            created_at: booking.created_at.to_rfc3339(),
            queued_at: booking.queued_at.map(|t| t.to_rfc3339()),
            served_at: booking.served_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Body of `POST /api/bookings`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingReq {
    #[serde(default)]
    #[schema(example = "Jane Doe")]
    pub patient_name: String,
    #[schema(example = 1)]
    pub equipment_id: u64,
    /// Unknown values are treated as `NORMAL`.
    #[serde(default)]
    #[schema(example = "URGENT")]
    pub requested_priority: Option<String>,
    /// Local `YYYY-MM-DDTHH:MM[:SS]`; empty or absent means as soon as possible.
    #[serde(default)]
    #[schema(example = "2026-02-14T10:30")]
    pub slot_time: Option<String>,
}

impl From<CreateBookingReq> for BookingSubmission {
    fn from(req: CreateBookingReq) -> Self {
        BookingSubmission {
            patient_name: req.patient_name,
            equipment_id: EquipmentId::new(req.equipment_id),
            requested_priority: req.requested_priority,
            slot_time: req.slot_time,
        }
    }
}

/// Query string of `GET /api/bookings/pending`.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PendingQuery {
    /// Only return bookings for this unit.
    pub equipment_id: Option<u64>,
}

/// Body of `POST /api/bookings/{id}/confirm`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmBookingReq {
    #[schema(example = "EMERGENCY")]
    pub assigned_priority: String,
}

/// Body of `POST /api/equipment/{id}/status`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SetStatusReq {
    #[schema(example = "MAINTENANCE")]
    pub status: String,
}

/// Error body returned with every non-2xx response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    /// Human-readable explanation, shown to the user as-is.
    pub message: String,
    /// Machine-readable kind such as `NOT_FOUND` or `EMPTY_QUEUE`.
    #[schema(example = "INVALID_INPUT")]
    pub error: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: error.into(),
        }
    }
}

impl From<&BookingError> for ErrorRes {
    fn from(err: &BookingError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}
