//! Equipment registry.
//!
//! Holds every known equipment unit together with its dynamic dispatch state. The set of units is
//! fixed at bootstrap from an [`EquipmentCatalogue`]; only status and occupancy change afterwards,
//! and only through the [`QueueDispatcher`](crate::QueueDispatcher).
//!
//! ## Locking
//!
//! Each unit carries two locks:
//!
//! - `state`: an `RwLock` around status, current booking and expected finish time. Readers always
//!   see a complete snapshot.
//! - `lane`: a `Mutex<()>` that serialises queue mutations (triage and dispatch) for that unit.
//!   Lanes of different units are independent.

use crate::catalogue::{EquipmentCatalogue, EquipmentSpec};
use crate::sync;
use crate::{BookingError, BookingResult};
use chrono::{DateTime, Utc};
use evervault_types::{BookingId, EquipmentId, EquipmentStatus, NonEmptyText};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, RwLock};

/// Snapshot of an equipment unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Equipment {
    pub id: EquipmentId,
    pub name: NonEmptyText,
    pub kind: NonEmptyText,
    pub status: EquipmentStatus,
    /// Procedure duration in minutes.
    pub buffer_time: u32,
    /// Booking currently on the machine, if any.
    pub current_booking: Option<BookingId>,
    /// When the current procedure is expected to finish.
    pub busy_until: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug)]
struct UnitState {
    status: EquipmentStatus,
    current_booking: Option<BookingId>,
    busy_until: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct Unit {
    spec: EquipmentSpec,
    state: RwLock<UnitState>,
    lane: Mutex<()>,
}

impl Unit {
    fn snapshot(&self) -> Equipment {
        let state = *sync::read(&self.state);
        Equipment {
            id: self.spec.id,
            name: self.spec.name.clone(),
            kind: self.spec.kind.clone(),
            status: state.status,
            buffer_time: self.spec.buffer_time,
            current_booking: state.current_booking,
            busy_until: state.busy_until,
        }
    }
}

#[derive(Debug)]
pub struct EquipmentRegistry {
    units: BTreeMap<EquipmentId, Unit>,
}

impl EquipmentRegistry {
    /// Bootstrap a registry from a validated catalogue.
    pub fn from_catalogue(catalogue: EquipmentCatalogue) -> Self {
        let units = catalogue
            .into_entries()
            .into_iter()
            .map(|spec| {
                let state = UnitState {
                    status: spec.status,
                    current_booking: None,
                    busy_until: None,
                };
                (
                    spec.id,
                    Unit {
                        spec,
                        state: RwLock::new(state),
                        lane: Mutex::new(()),
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        tracing::info!("equipment registry initialised with {} units", units.len());
        Self { units }
    }

    /// All units in ascending id order.
    pub fn list(&self) -> Vec<Equipment> {
        self.units.values().map(Unit::snapshot).collect()
    }

    /// # Errors
    ///
    /// Returns `BookingError::EquipmentNotFound` for an unknown id.
    pub fn get(&self, id: EquipmentId) -> BookingResult<Equipment> {
        self.unit(id).map(Unit::snapshot)
    }

    pub fn contains(&self, id: EquipmentId) -> bool {
        self.units.contains_key(&id)
    }

    fn unit(&self, id: EquipmentId) -> BookingResult<&Unit> {
        self.units
            .get(&id)
            .ok_or(BookingError::EquipmentNotFound(id))
    }

    /// Acquire the queue lane of a unit. Hold the guard for the whole read-decide-write sequence.
    pub(crate) fn lane(&self, id: EquipmentId) -> BookingResult<MutexGuard<'_, ()>> {
        Ok(sync::lock(&self.unit(id)?.lane))
    }

    pub(crate) fn set_status(&self, id: EquipmentId, status: EquipmentStatus) -> BookingResult<()> {
        let unit = self.unit(id)?;
        let mut state = sync::write(&unit.state);
        state.status = status;
        if status != EquipmentStatus::InUse {
            state.current_booking = None;
            state.busy_until = None;
        }
        Ok(())
    }

    /// Mark a unit `IN_USE` by `booking` until `busy_until`.
    pub(crate) fn occupy(
        &self,
        id: EquipmentId,
        booking: BookingId,
        busy_until: DateTime<Utc>,
    ) -> BookingResult<Equipment> {
        let unit = self.unit(id)?;
        {
            let mut state = sync::write(&unit.state);
            *state = UnitState {
                status: EquipmentStatus::InUse,
                current_booking: Some(booking),
                busy_until: Some(busy_until),
            };
        }
        Ok(unit.snapshot())
    }

    /// Return a unit to `AVAILABLE` if it is still occupied by `booking`.
    ///
    /// Returns `true` when the unit was released.
    pub(crate) fn release_if_current(
        &self,
        id: EquipmentId,
        booking: BookingId,
    ) -> BookingResult<bool> {
        let unit = self.unit(id)?;
        let mut state = sync::write(&unit.state);
        if state.status != EquipmentStatus::InUse || state.current_booking != Some(booking) {
            return Ok(false);
        }
        *state = UnitState {
            status: EquipmentStatus::Available,
            current_booking: None,
            busy_until: None,
        };
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> EquipmentRegistry {
        EquipmentRegistry::from_catalogue(EquipmentCatalogue::demo().unwrap())
    }

    #[test]
    fn test_list_is_in_id_order() {
        let ids: Vec<u64> = registry().list().iter().map(|e| e.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let err = registry().get(EquipmentId::new(99)).unwrap_err();
        assert!(matches!(err, BookingError::EquipmentNotFound(id) if id.get() == 99));
    }

    #[test]
    fn test_set_status_unknown_id_is_not_found() {
        let err = registry()
            .set_status(EquipmentId::new(42), EquipmentStatus::Available)
            .unwrap_err();
        assert!(matches!(err, BookingError::EquipmentNotFound(_)));
    }

    #[test]
    fn test_occupy_then_release_for_same_booking() {
        let registry = registry();
        let mri = EquipmentId::new(1);
        let until = Utc::now();

        let snapshot = registry.occupy(mri, BookingId::new(3), until).unwrap();
        assert_eq!(snapshot.status, EquipmentStatus::InUse);
        assert_eq!(snapshot.current_booking, Some(BookingId::new(3)));

        assert!(!registry.release_if_current(mri, BookingId::new(2)).unwrap());
        assert_eq!(registry.get(mri).unwrap().status, EquipmentStatus::InUse);

        assert!(registry.release_if_current(mri, BookingId::new(3)).unwrap());
        let after = registry.get(mri).unwrap();
        assert_eq!(after.status, EquipmentStatus::Available);
        assert_eq!(after.current_booking, None);
        assert_eq!(after.busy_until, None);
    }

    #[test]
    fn test_set_status_clears_occupancy_when_leaving_in_use() {
        let registry = registry();
        let ct = EquipmentId::new(2);
        registry.occupy(ct, BookingId::new(1), Utc::now()).unwrap();
        registry.set_status(ct, EquipmentStatus::Available).unwrap();
        assert_eq!(registry.get(ct).unwrap().current_booking, None);
    }
}
