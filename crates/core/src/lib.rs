//! # EverVault Core
//!
//! Core business logic for the EverVault equipment booking service.
//!
//! This crate contains pure booking operations over in-memory state:
//! - Equipment registry loaded from a YAML catalogue (or the built-in demo set)
//! - Booking intake with validation of patient name, unit and slot time
//! - Triage approval into per-unit priority queues
//! - Dispatch of the head of a queue and release of the unit afterwards
//!
//! **No API concerns**: HTTP servers, JSON shapes and timers belong in `api-rest` or `api-shared`.

pub mod bookings;
pub mod catalogue;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod schedule;
pub mod service;
pub mod triage;
pub mod validation;

mod sync;

pub use bookings::{BookingRequest, BookingStore, NewBooking};
pub use catalogue::{EquipmentCatalogue, EquipmentSpec};
pub use config::{release_policy_from_env_value, CoreConfig, ReleasePolicy};
pub use dispatch::{Dispatch, QueueDispatcher};
pub use error::{BookingError, BookingResult};
pub use registry::{Equipment, EquipmentRegistry};
pub use service::{BookingSubmission, EquipmentView, HospitalService};
pub use triage::TriageEngine;

pub use evervault_types::{
    BookingId, BookingState, EquipmentId, EquipmentStatus, NonEmptyText, Priority, TextError,
};
