//! Booking store.
//!
//! Holds every booking request ever submitted. Bookings live in one of two logical pools:
//!
//! - *pending*: submitted by a patient, waiting for triage (`PENDING`)
//! - *queued*: triaged and waiting for the machine (`QUEUED`)
//!
//! Served bookings stay in the store as an archive so they can still be looked up by id, but they
//! never appear in either pool.
//!
//! The operational queue of a unit is not stored anywhere. It is derived on every read from the
//! queued pool, ordered by assigned priority (highest first) and then by triage order.

use crate::registry::EquipmentRegistry;
use crate::sync;
use crate::validation::ensure_future_slot;
use crate::{BookingError, BookingResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use evervault_types::{BookingId, BookingState, EquipmentId, EquipmentStatus, NonEmptyText, Priority};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// A patient's request for time on one equipment unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingRequest {
    pub id: BookingId,
    pub patient_name: NonEmptyText,
    pub equipment_id: EquipmentId,
    /// What the patient asked for. Advisory only.
    pub requested_priority: Priority,
    /// What triage decided. Authoritative for queue order once set.
    pub assigned_priority: Option<Priority>,
    /// Preferred slot in the hospital's local time; `None` means as soon as possible.
    pub slot_time: Option<NaiveDateTime>,
    pub state: BookingState,
    pub created_at: DateTime<Utc>,
    pub queued_at: Option<DateTime<Utc>>,
    pub served_at: Option<DateTime<Utc>>,
    triage_seq: Option<u64>,
}

impl BookingRequest {
    /// The priority that currently applies: the assigned one after triage, else the requested one.
    pub fn effective_priority(&self) -> Priority {
        self.assigned_priority.unwrap_or(self.requested_priority)
    }

    /// Sort key inside an operational queue. Only queued bookings have one.
    fn queue_key(&self) -> Option<(Reverse<Priority>, u64)> {
        match (self.state, self.assigned_priority, self.triage_seq) {
            (BookingState::Queued, Some(priority), Some(seq)) => Some((Reverse(priority), seq)),
            _ => None,
        }
    }
}

/// Validated input for [`BookingStore::create`].
#[derive(Clone, Debug)]
pub struct NewBooking {
    pub patient_name: NonEmptyText,
    pub equipment_id: EquipmentId,
    pub requested_priority: Priority,
    pub slot_time: Option<NaiveDateTime>,
}

#[derive(Debug, Default)]
struct Ledger {
    bookings: BTreeMap<BookingId, BookingRequest>,
    last_id: u64,
    last_triage_seq: u64,
}

impl Ledger {
    fn get_mut(&mut self, id: BookingId) -> BookingResult<&mut BookingRequest> {
        self.bookings
            .get_mut(&id)
            .ok_or(BookingError::BookingNotFound(id))
    }

    fn queued_for(&self, equipment_id: EquipmentId) -> impl Iterator<Item = &BookingRequest> {
        self.bookings
            .values()
            .filter(move |b| b.equipment_id == equipment_id && b.state == BookingState::Queued)
    }
}

#[derive(Debug)]
pub struct BookingStore {
    registry: Arc<EquipmentRegistry>,
    ledger: RwLock<Ledger>,
}

impl BookingStore {
    pub fn new(registry: Arc<EquipmentRegistry>) -> Self {
        Self {
            registry,
            ledger: RwLock::new(Ledger::default()),
        }
    }

    pub fn registry(&self) -> &Arc<EquipmentRegistry> {
        &self.registry
    }

    /// Submit a new booking request.
    ///
    /// `now` is the current local wall-clock time, against which `slot_time` is checked.
    ///
    /// # Errors
    ///
    /// Returns `BookingError` if:
    /// - the equipment id does not exist (`InvalidReference`),
    /// - the unit is under maintenance (`Unavailable`),
    /// - the slot time is not strictly in the future (`PastSlotRejected`).
    ///
    /// Nothing is stored when an error is returned.
    pub fn create(&self, booking: NewBooking, now: NaiveDateTime) -> BookingResult<BookingRequest> {
        let equipment_id = booking.equipment_id;
        // Held until the record is stored so a status change cannot slip in after the check.
        let lane = self
            .registry
            .lane(equipment_id)
            .map_err(|_| BookingError::InvalidReference(equipment_id))?;
        let equipment = self
            .registry
            .get(equipment_id)
            .map_err(|_| BookingError::InvalidReference(equipment_id))?;

        if equipment.status == EquipmentStatus::Maintenance {
            return Err(BookingError::Unavailable {
                name: equipment.name.into_inner(),
            });
        }

        ensure_future_slot(booking.slot_time, now)?;

        let mut ledger = sync::write(&self.ledger);
        ledger.last_id += 1;
        let record = BookingRequest {
            id: BookingId::new(ledger.last_id),
            patient_name: booking.patient_name,
            equipment_id: booking.equipment_id,
            requested_priority: booking.requested_priority,
            assigned_priority: None,
            slot_time: booking.slot_time,
            state: BookingState::Pending,
            created_at: Utc::now(),
            queued_at: None,
            served_at: None,
            triage_seq: None,
        };
        ledger.bookings.insert(record.id, record.clone());
        drop(ledger);
        drop(lane);

        tracing::info!(
            "booking {} created for equipment {} ({} requested)",
            record.id,
            record.equipment_id,
            record.requested_priority
        );
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `BookingError::BookingNotFound` for an unknown id.
    pub fn get(&self, id: BookingId) -> BookingResult<BookingRequest> {
        sync::read(&self.ledger)
            .bookings
            .get(&id)
            .cloned()
            .ok_or(BookingError::BookingNotFound(id))
    }

    /// Pending bookings in submission order, optionally scoped to one unit.
    pub fn list_pending(&self, equipment_id: Option<EquipmentId>) -> Vec<BookingRequest> {
        sync::read(&self.ledger)
            .bookings
            .values()
            .filter(|b| b.state == BookingState::Pending)
            .filter(|b| match equipment_id {
                Some(id) => b.equipment_id == id,
                None => true,
            })
            .cloned()
            .collect()
    }

    /// The operational queue of a unit, head first.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::EquipmentNotFound` for an unknown unit.
    pub fn list_queued(&self, equipment_id: EquipmentId) -> BookingResult<Vec<BookingRequest>> {
        self.ensure_equipment(equipment_id)?;
        let mut queue: Vec<BookingRequest> = sync::read(&self.ledger)
            .queued_for(equipment_id)
            .cloned()
            .collect();
        queue.sort_by_key(BookingRequest::queue_key);
        Ok(queue)
    }

    /// Number of queued bookings for a unit.
    pub fn queue_length(&self, equipment_id: EquipmentId) -> usize {
        sync::read(&self.ledger).queued_for(equipment_id).count()
    }

    /// Head of a unit's operational queue, without removing it.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::EquipmentNotFound` for an unknown unit.
    pub fn head(&self, equipment_id: EquipmentId) -> BookingResult<Option<BookingRequest>> {
        self.ensure_equipment(equipment_id)?;
        Ok(sync::read(&self.ledger)
            .queued_for(equipment_id)
            .min_by_key(|b| b.queue_key())
            .cloned())
    }

    fn ensure_equipment(&self, equipment_id: EquipmentId) -> BookingResult<()> {
        if self.registry.contains(equipment_id) {
            Ok(())
        } else {
            Err(BookingError::EquipmentNotFound(equipment_id))
        }
    }

    /// Move a pending booking into the queued pool. Callers must hold the unit's lane.
    pub(crate) fn mark_queued(
        &self,
        id: BookingId,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> BookingResult<BookingRequest> {
        let mut ledger = sync::write(&self.ledger);
        let seq = ledger.last_triage_seq + 1;
        let booking = ledger.get_mut(id)?;
        expect_state(booking, BookingState::Pending)?;

        booking.state = BookingState::Queued;
        booking.assigned_priority = Some(priority);
        booking.queued_at = Some(now);
        booking.triage_seq = Some(seq);
        let updated = booking.clone();
        ledger.last_triage_seq = seq;
        Ok(updated)
    }

    /// Move a queued booking to served. Callers must hold the unit's lane.
    pub(crate) fn mark_served(
        &self,
        id: BookingId,
        now: DateTime<Utc>,
    ) -> BookingResult<BookingRequest> {
        let mut ledger = sync::write(&self.ledger);
        let booking = ledger.get_mut(id)?;
        expect_state(booking, BookingState::Queued)?;

        booking.state = BookingState::Served;
        booking.served_at = Some(now);
        Ok(booking.clone())
    }
}

fn expect_state(booking: &BookingRequest, expected: BookingState) -> BookingResult<()> {
    if booking.state == expected {
        Ok(())
    } else {
        Err(BookingError::InvalidState {
            id: booking.id,
            expected,
            actual: booking.state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::EquipmentCatalogue;
    use chrono::NaiveDate;

    const MRI: EquipmentId = EquipmentId::new(1);
    const CT: EquipmentId = EquipmentId::new(2);
    const PET: EquipmentId = EquipmentId::new(5);

    fn store() -> BookingStore {
        let registry = EquipmentRegistry::from_catalogue(EquipmentCatalogue::demo().unwrap());
        BookingStore::new(Arc::new(registry))
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 14)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn new_booking(name: &str, equipment_id: EquipmentId, priority: Priority) -> NewBooking {
        NewBooking {
            patient_name: NonEmptyText::new(name).unwrap(),
            equipment_id,
            requested_priority: priority,
            slot_time: Some(now() + chrono::Duration::hours(2)),
        }
    }

    #[test]
    fn test_create_starts_pending_and_is_listed() {
        let store = store();
        let booking = store
            .create(new_booking("Jane Doe", MRI, Priority::Normal), now())
            .unwrap();

        assert_eq!(booking.state, BookingState::Pending);
        assert_eq!(booking.assigned_priority, None);
        assert_eq!(store.list_pending(Some(MRI)), vec![booking.clone()]);
        assert!(store.list_pending(Some(CT)).is_empty());
        assert_eq!(store.get(booking.id).unwrap(), booking);
    }

    #[test]
    fn test_create_assigns_monotonic_ids() {
        let store = store();
        let a = store.create(new_booking("A", MRI, Priority::Normal), now()).unwrap();
        let b = store.create(new_booking("B", CT, Priority::Normal), now()).unwrap();
        assert_eq!(a.id, BookingId::new(1));
        assert_eq!(b.id, BookingId::new(2));
    }

    #[test]
    fn test_create_rejects_unknown_equipment() {
        let store = store();
        let err = store
            .create(new_booking("A", EquipmentId::new(77), Priority::Normal), now())
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidReference(id) if id.get() == 77));
        assert!(store.list_pending(None).is_empty());
    }

    #[test]
    fn test_create_rejects_maintenance_unit() {
        let store = store();
        let err = store
            .create(new_booking("A", PET, Priority::Urgent), now())
            .unwrap_err();
        match err {
            BookingError::Unavailable { name } => assert_eq!(name, "PET-CT"),
            other => panic!("Expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_create_waits_for_lane_and_sees_maintenance() {
        let store = store();
        let lane = store.registry().lane(MRI).unwrap();

        std::thread::scope(|scope| {
            let submit = scope.spawn(|| store.create(new_booking("A", MRI, Priority::Normal), now()));
            std::thread::sleep(std::time::Duration::from_millis(50));
            store
                .registry()
                .set_status(MRI, EquipmentStatus::Maintenance)
                .unwrap();
            drop(lane);

            let err = submit.join().unwrap().unwrap_err();
            assert!(matches!(err, BookingError::Unavailable { .. }));
        });
        assert!(store.list_pending(None).is_empty());
    }

    #[test]
    fn test_create_rejects_past_slot_and_stores_nothing() {
        let store = store();
        let mut booking = new_booking("Late", MRI, Priority::Normal);
        booking.slot_time = Some(now() - chrono::Duration::minutes(1));

        let err = store.create(booking, now()).unwrap_err();
        assert!(matches!(err, BookingError::PastSlotRejected));
        assert!(store.list_pending(None).is_empty());
    }

    #[test]
    fn test_create_without_slot_is_accepted() {
        let store = store();
        let mut booking = new_booking("Asap", MRI, Priority::Normal);
        booking.slot_time = None;
        assert!(store.create(booking, now()).unwrap().slot_time.is_none());
    }

    #[test]
    fn test_list_pending_unscoped_keeps_submission_order() {
        let store = store();
        let a = store.create(new_booking("A", CT, Priority::Normal), now()).unwrap();
        let b = store.create(new_booking("B", MRI, Priority::Emergency), now()).unwrap();
        let ids: Vec<_> = store.list_pending(None).into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_queue_orders_by_priority_then_triage_order() {
        let store = store();
        let n1 = store.create(new_booking("N1", MRI, Priority::Normal), now()).unwrap();
        let u1 = store.create(new_booking("U1", MRI, Priority::Normal), now()).unwrap();
        let e1 = store.create(new_booking("E1", MRI, Priority::Normal), now()).unwrap();
        let n2 = store.create(new_booking("N2", MRI, Priority::Normal), now()).unwrap();

        // Triage order differs from submission order on purpose.
        let t = Utc::now();
        store.mark_queued(n2.id, Priority::Normal, t).unwrap();
        store.mark_queued(u1.id, Priority::Urgent, t).unwrap();
        store.mark_queued(n1.id, Priority::Normal, t).unwrap();
        store.mark_queued(e1.id, Priority::Emergency, t).unwrap();

        let ids: Vec<_> = store.list_queued(MRI).unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![e1.id, u1.id, n2.id, n1.id]);
        assert_eq!(store.head(MRI).unwrap().map(|b| b.id), Some(e1.id));
        assert_eq!(store.queue_length(MRI), 4);
        assert!(store.list_pending(Some(MRI)).is_empty());
    }

    #[test]
    fn test_mark_queued_twice_is_invalid_state() {
        let store = store();
        let booking = store.create(new_booking("A", MRI, Priority::Normal), now()).unwrap();
        store.mark_queued(booking.id, Priority::Urgent, Utc::now()).unwrap();

        let err = store
            .mark_queued(booking.id, Priority::Emergency, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvalidState {
                expected: BookingState::Pending,
                actual: BookingState::Queued,
                ..
            }
        ));
        assert_eq!(
            store.get(booking.id).unwrap().assigned_priority,
            Some(Priority::Urgent)
        );
    }

    #[test]
    fn test_mark_served_requires_queued() {
        let store = store();
        let booking = store.create(new_booking("A", MRI, Priority::Normal), now()).unwrap();
        let err = store.mark_served(booking.id, Utc::now()).unwrap_err();
        assert!(matches!(err, BookingError::InvalidState { .. }));
    }

    #[test]
    fn test_served_bookings_leave_both_pools() {
        let store = store();
        let booking = store.create(new_booking("A", MRI, Priority::Normal), now()).unwrap();
        store.mark_queued(booking.id, Priority::Normal, Utc::now()).unwrap();
        let served = store.mark_served(booking.id, Utc::now()).unwrap();

        assert_eq!(served.state, BookingState::Served);
        assert!(served.served_at.is_some());
        assert!(store.list_pending(None).is_empty());
        assert!(store.list_queued(MRI).unwrap().is_empty());
        assert_eq!(store.get(booking.id).unwrap().state, BookingState::Served);
    }

    #[test]
    fn test_queue_of_unknown_equipment_is_not_found() {
        let store = store();
        assert!(matches!(
            store.list_queued(EquipmentId::new(99)),
            Err(BookingError::EquipmentNotFound(_))
        ));
        assert!(store.head(EquipmentId::new(99)).is_err());
    }

    #[test]
    fn test_effective_priority_prefers_assigned() {
        let store = store();
        let booking = store.create(new_booking("A", MRI, Priority::Emergency), now()).unwrap();
        assert_eq!(booking.effective_priority(), Priority::Emergency);
        let queued = store.mark_queued(booking.id, Priority::Normal, Utc::now()).unwrap();
        assert_eq!(queued.effective_priority(), Priority::Normal);
    }
}
