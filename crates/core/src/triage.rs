//! Triage engine.
//!
//! Triage is the admin act of giving a pending booking its authoritative priority. Approval moves
//! the booking from the pending pool into the operational queue of its unit.

use crate::bookings::{BookingRequest, BookingStore};
use crate::BookingResult;
use chrono::Utc;
use evervault_types::{BookingId, Priority};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct TriageEngine {
    store: Arc<BookingStore>,
}

impl TriageEngine {
    pub fn new(store: Arc<BookingStore>) -> Self {
        Self { store }
    }

    /// Approve a pending booking with an assigned priority.
    ///
    /// The assigned priority may differ from what the patient requested and decides queue order.
    /// Within one priority band, bookings approved earlier are served earlier.
    ///
    /// Approval runs inside the lane of the booking's unit, so it never interleaves with a
    /// dispatch on that unit.
    ///
    /// # Errors
    ///
    /// Returns `BookingError` if:
    /// - the booking does not exist (`BookingNotFound`),
    /// - the booking is not `PENDING` (`InvalidState`), including a second approval.
    pub fn approve(&self, id: BookingId, assigned: Priority) -> BookingResult<BookingRequest> {
        // A booking never changes unit, so the lookup can happen before taking the lane.
        let equipment_id = self.store.get(id)?.equipment_id;
        let _lane = self.store.registry().lane(equipment_id)?;

        match self.store.mark_queued(id, assigned, Utc::now()) {
            Ok(booking) => {
                tracing::info!(
                    "booking {} triaged as {} for equipment {}",
                    booking.id,
                    assigned,
                    equipment_id
                );
                Ok(booking)
            }
            Err(e) => {
                tracing::warn!("triage of booking {} rejected: {}", id, e);
                Err(e)
            }
        }
    }
}
