//! Queue dispatcher.
//!
//! Serves the operational queue of one equipment unit: shows who is next, calls them in, and
//! returns the unit to service when the procedure is over. This is the only component that
//! changes equipment status after bootstrap.

use crate::bookings::{BookingRequest, BookingStore};
use crate::registry::{Equipment, EquipmentRegistry};
use crate::{BookingError, BookingResult};
use chrono::{Duration, Utc};
use evervault_types::{BookingId, BookingState, EquipmentId, EquipmentStatus};
use std::sync::Arc;

/// Outcome of [`QueueDispatcher::call_next`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// The head of the queue was called in and the unit is now in use.
    Served {
        booking: BookingRequest,
        equipment: Equipment,
    },
    /// Nothing was queued; no state changed.
    Empty,
}

#[derive(Clone, Debug)]
pub struct QueueDispatcher {
    store: Arc<BookingStore>,
}

impl QueueDispatcher {
    pub fn new(store: Arc<BookingStore>) -> Self {
        Self { store }
    }

    fn registry(&self) -> &EquipmentRegistry {
        self.store.registry()
    }

    /// The booking that `call_next` would serve right now.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::EquipmentNotFound` for an unknown unit.
    pub fn peek_next(&self, equipment_id: EquipmentId) -> BookingResult<Option<BookingRequest>> {
        self.store.head(equipment_id)
    }

    /// Call the head of the queue into the unit.
    ///
    /// The head is marked `SERVED` and the unit becomes `IN_USE` for its buffer time. The whole
    /// sequence runs inside the unit's lane, so two concurrent calls can never serve the same
    /// booking and a concurrent approval can never slip in ahead of the computed head.
    ///
    /// # Errors
    ///
    /// Returns `BookingError` if:
    /// - the unit does not exist (`EquipmentNotFound`),
    /// - the queue is non-empty but the unit is under maintenance (`Unavailable`).
    ///
    /// An empty queue is not an error; it yields [`Dispatch::Empty`].
    pub fn call_next(&self, equipment_id: EquipmentId) -> BookingResult<Dispatch> {
        let _lane = self.registry().lane(equipment_id)?;

        let Some(head) = self.store.head(equipment_id)? else {
            tracing::debug!("call next on equipment {}: queue empty", equipment_id);
            return Ok(Dispatch::Empty);
        };

        let unit = self.registry().get(equipment_id)?;
        if unit.status == EquipmentStatus::Maintenance {
            return Err(BookingError::Unavailable {
                name: unit.name.into_inner(),
            });
        }

        let buffer_time = unit.buffer_time;
        let now = Utc::now();
        let booking = self.store.mark_served(head.id, now)?;
        let busy_until = now + Duration::minutes(i64::from(buffer_time));
        let equipment = self.registry().occupy(equipment_id, booking.id, busy_until)?;

        tracing::info!(
            "equipment {} now IN_USE for booking {} ({}) until {}",
            equipment_id,
            booking.id,
            booking.effective_priority(),
            busy_until.to_rfc3339()
        );
        Ok(Dispatch::Served { booking, equipment })
    }

    /// Finish the procedure of a served booking.
    ///
    /// If the booking is still on its unit, the unit returns to `AVAILABLE`. If the unit has
    /// already been released or has moved on to another patient it is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `BookingError` if:
    /// - the booking does not exist (`BookingNotFound`),
    /// - the booking has not been served yet (`InvalidState`).
    pub fn release(&self, booking_id: BookingId) -> BookingResult<Equipment> {
        let booking = self.store.get(booking_id)?;
        if booking.state != BookingState::Served {
            return Err(BookingError::InvalidState {
                id: booking.id,
                expected: BookingState::Served,
                actual: booking.state,
            });
        }

        let _lane = self.registry().lane(booking.equipment_id)?;
        if self
            .registry()
            .release_if_current(booking.equipment_id, booking.id)?
        {
            tracing::info!(
                "equipment {} released after booking {}",
                booking.equipment_id,
                booking.id
            );
        }
        self.registry().get(booking.equipment_id)
    }

    /// Release a unit on a timer, but only if it is still serving `booking_id`.
    ///
    /// Returns `true` when the unit was released. A stale timer for an earlier patient returns
    /// `false` and leaves the unit alone.
    pub fn release_if_current(
        &self,
        equipment_id: EquipmentId,
        booking_id: BookingId,
    ) -> BookingResult<bool> {
        let _lane = self.registry().lane(equipment_id)?;
        let released = self.registry().release_if_current(equipment_id, booking_id)?;
        if released {
            tracing::info!(
                "equipment {} is now AVAILABLE (automatic release after booking {})",
                equipment_id,
                booking_id
            );
        }
        Ok(released)
    }

    /// Override the status of a unit, for example to take it out of service.
    ///
    /// # Errors
    ///
    /// Returns `BookingError` if:
    /// - the unit does not exist (`EquipmentNotFound`),
    /// - `status` is `IN_USE`, which only `call_next` may set (`InvalidInput`).
    pub fn set_status(
        &self,
        equipment_id: EquipmentId,
        status: EquipmentStatus,
    ) -> BookingResult<Equipment> {
        if status == EquipmentStatus::InUse {
            return Err(BookingError::InvalidInput(
                "IN_USE is set by calling the next patient, not directly".into(),
            ));
        }

        let _lane = self.registry().lane(equipment_id)?;
        self.registry().set_status(equipment_id, status)?;
        tracing::info!("equipment {} status set to {}", equipment_id, status);
        self.registry().get(equipment_id)
    }
}
