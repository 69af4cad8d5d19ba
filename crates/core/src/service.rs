//! Hospital service.
//!
//! The entry point used by the API and CLI crates. It wires the registry, booking store, triage
//! engine and dispatcher together over shared state and adds the derived equipment view
//! (`queue_length`, `next_available`).

use crate::bookings::{BookingRequest, BookingStore, NewBooking};
use crate::catalogue::EquipmentCatalogue;
use crate::config::CoreConfig;
use crate::dispatch::{Dispatch, QueueDispatcher};
use crate::registry::{Equipment, EquipmentRegistry};
use crate::schedule::next_available;
use crate::triage::TriageEngine;
use crate::validation::{parse_slot_time, validate_patient_name};
use crate::BookingResult;
use chrono::{Local, Utc};
use evervault_types::{BookingId, EquipmentId, EquipmentStatus, Priority};
use std::sync::Arc;

/// An equipment snapshot together with its derived queue information.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquipmentView {
    pub equipment: Equipment,
    pub queue_length: usize,
    pub next_available: String,
}

/// A booking as submitted by a patient, before validation.
#[derive(Clone, Debug)]
pub struct BookingSubmission {
    pub patient_name: String,
    pub equipment_id: EquipmentId,
    /// Unknown or missing values fall back to `NORMAL`.
    pub requested_priority: Option<String>,
    /// `YYYY-MM-DDTHH:MM[:SS]` in local time; blank means as soon as possible.
    pub slot_time: Option<String>,
}

/// Pure booking operations - no API concerns
#[derive(Clone, Debug)]
pub struct HospitalService {
    cfg: Arc<CoreConfig>,
    store: Arc<BookingStore>,
    triage: TriageEngine,
    dispatcher: QueueDispatcher,
}

impl HospitalService {
    /// Creates a service over the catalogue named by `cfg`.
    ///
    /// # Errors
    ///
    /// Returns a catalogue error if the configured file cannot be read or is invalid.
    pub fn new(cfg: Arc<CoreConfig>) -> BookingResult<Self> {
        let catalogue = cfg.load_catalogue()?;
        Ok(Self::with_catalogue(cfg, catalogue))
    }

    /// Creates a service over an explicit catalogue.
    pub fn with_catalogue(cfg: Arc<CoreConfig>, catalogue: EquipmentCatalogue) -> Self {
        let registry = Arc::new(EquipmentRegistry::from_catalogue(catalogue));
        let store = Arc::new(BookingStore::new(registry));
        Self {
            cfg,
            triage: TriageEngine::new(store.clone()),
            dispatcher: QueueDispatcher::new(store.clone()),
            store,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    fn view(&self, equipment: Equipment) -> EquipmentView {
        let queue_length = self.store.queue_length(equipment.id);
        let next_available = next_available(&equipment, queue_length, Utc::now());
        EquipmentView {
            equipment,
            queue_length,
            next_available,
        }
    }

    /// Every unit with its queue length and next-slot estimate, in id order.
    pub fn equipment_overview(&self) -> Vec<EquipmentView> {
        self.store
            .registry()
            .list()
            .into_iter()
            .map(|equipment| self.view(equipment))
            .collect()
    }

    pub fn equipment(&self, id: EquipmentId) -> BookingResult<EquipmentView> {
        let equipment = self.store.registry().get(id)?;
        Ok(self.view(equipment))
    }

    /// Validate and store a patient's booking request.
    ///
    /// # Errors
    ///
    /// Returns `BookingError` if:
    /// - the patient name is blank or too long, or the slot time is malformed (`InvalidInput`),
    /// - the unit does not exist (`InvalidReference`) or is under maintenance (`Unavailable`),
    /// - the slot time is not in the future (`PastSlotRejected`).
    pub fn submit_booking(&self, submission: BookingSubmission) -> BookingResult<BookingRequest> {
        let patient_name = validate_patient_name(&submission.patient_name)?;
        let slot_time = parse_slot_time(submission.slot_time.as_deref())?;
        let requested_priority =
            Priority::parse_or_default(submission.requested_priority.as_deref());

        self.store.create(
            NewBooking {
                patient_name,
                equipment_id: submission.equipment_id,
                requested_priority,
                slot_time,
            },
            Local::now().naive_local(),
        )
    }

    pub fn booking(&self, id: BookingId) -> BookingResult<BookingRequest> {
        self.store.get(id)
    }

    pub fn pending(&self, equipment_id: Option<EquipmentId>) -> Vec<BookingRequest> {
        self.store.list_pending(equipment_id)
    }

    pub fn queue(&self, equipment_id: EquipmentId) -> BookingResult<Vec<BookingRequest>> {
        self.store.list_queued(equipment_id)
    }

    pub fn approve(&self, id: BookingId, assigned: Priority) -> BookingResult<BookingRequest> {
        self.triage.approve(id, assigned)
    }

    pub fn peek_next(&self, equipment_id: EquipmentId) -> BookingResult<Option<BookingRequest>> {
        self.dispatcher.peek_next(equipment_id)
    }

    pub fn call_next(&self, equipment_id: EquipmentId) -> BookingResult<Dispatch> {
        self.dispatcher.call_next(equipment_id)
    }

    pub fn release(&self, booking_id: BookingId) -> BookingResult<EquipmentView> {
        let equipment = self.dispatcher.release(booking_id)?;
        Ok(self.view(equipment))
    }

    pub fn release_if_current(
        &self,
        equipment_id: EquipmentId,
        booking_id: BookingId,
    ) -> BookingResult<bool> {
        self.dispatcher.release_if_current(equipment_id, booking_id)
    }

    pub fn set_status(
        &self,
        equipment_id: EquipmentId,
        status: EquipmentStatus,
    ) -> BookingResult<EquipmentView> {
        let equipment = self.dispatcher.set_status(equipment_id, status)?;
        Ok(self.view(equipment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReleasePolicy;
    use crate::BookingError;
    use evervault_types::BookingState;

    fn service() -> HospitalService {
        let cfg = Arc::new(CoreConfig::new(None, ReleasePolicy::Manual).unwrap());
        HospitalService::new(cfg).unwrap()
    }

    fn submission(name: &str, equipment_id: u64, priority: &str) -> BookingSubmission {
        BookingSubmission {
            patient_name: name.into(),
            equipment_id: EquipmentId::new(equipment_id),
            requested_priority: Some(priority.into()),
            slot_time: None,
        }
    }

    #[test]
    fn test_overview_reports_queue_length_and_next_slot() {
        let service = service();
        let booking = service.submit_booking(submission("A", 2, "NORMAL")).unwrap();

        let ct = service.equipment(EquipmentId::new(2)).unwrap();
        assert_eq!(ct.queue_length, 0);
        assert_eq!(ct.next_available, "Now");

        service.approve(booking.id, Priority::Normal).unwrap();
        let overview = service.equipment_overview();
        assert_eq!(overview.len(), 5);
        let ct = &overview[1];
        assert_eq!(ct.equipment.id, EquipmentId::new(2));
        assert_eq!(ct.queue_length, 1);
        assert_ne!(ct.next_available, "Now");

        let pet = &overview[4];
        assert_eq!(pet.next_available, "Under Repair");
    }

    #[test]
    fn test_submit_blank_name_stores_nothing() {
        let service = service();
        let err = service.submit_booking(submission("", 1, "NORMAL")).unwrap_err();
        assert!(matches!(err, BookingError::InvalidInput(_)));
        assert!(service.pending(None).is_empty());
    }

    #[test]
    fn test_submit_unknown_priority_falls_back_to_normal() {
        let service = service();
        let booking = service
            .submit_booking(submission("A", 1, "INVALID_PRIORITY"))
            .unwrap();
        assert_eq!(booking.requested_priority, Priority::Normal);
    }

    #[test]
    fn test_submit_past_slot_is_rejected() {
        let service = service();
        let mut past = submission("A", 1, "URGENT");
        past.slot_time = Some("2000-01-01T09:00".into());
        let err = service.submit_booking(past).unwrap_err();
        assert!(matches!(err, BookingError::PastSlotRejected));
    }

    #[test]
    fn test_submit_future_slot_is_kept() {
        let service = service();
        let mut future = submission("A", 1, "URGENT");
        future.slot_time = Some("2999-12-31T10:00".into());
        let booking = service.submit_booking(future).unwrap();
        assert!(booking.slot_time.is_some());
        assert_eq!(booking.state, BookingState::Pending);
    }

    #[test]
    fn test_submit_unknown_equipment_is_invalid_reference() {
        let service = service();
        let err = service.submit_booking(submission("A", 42, "NORMAL")).unwrap_err();
        assert!(matches!(err, BookingError::InvalidReference(_)));
    }

    #[test]
    fn test_release_reports_available_view() {
        let service = service();
        let booking = service.submit_booking(submission("A", 3, "NORMAL")).unwrap();
        service.approve(booking.id, Priority::Urgent).unwrap();
        assert!(matches!(
            service.call_next(EquipmentId::new(3)).unwrap(),
            Dispatch::Served { .. }
        ));
        assert_eq!(
            service.equipment(EquipmentId::new(3)).unwrap().equipment.status,
            EquipmentStatus::InUse
        );

        let view = service.release(booking.id).unwrap();
        assert_eq!(view.equipment.status, EquipmentStatus::Available);
        assert_eq!(view.next_available, "Now");
    }
}
