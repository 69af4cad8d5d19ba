//! Automatic return of equipment to service once a procedure should be over.

use evervault_core::{BookingId, Equipment, HospitalService};
use tokio::task::JoinHandle;

/// Spawn the release timer for a unit that has just been occupied by `booking_id`.
///
/// Returns `None` under the manual release policy. The timer only frees the unit if it is still
/// serving the same booking when it fires.
pub fn schedule_release(
    service: &HospitalService,
    equipment: &Equipment,
    booking_id: BookingId,
) -> Option<JoinHandle<()>> {
    let delay = service
        .config()
        .release_policy()
        .delay_for(equipment.buffer_time)?;
    let service = service.clone();
    let equipment_id = equipment.id;

    tracing::debug!(
        "equipment {} will be released in {}s unless it moves on",
        equipment_id,
        delay.as_secs()
    );

    Some(tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match service.release_if_current(equipment_id, booking_id) {
            Ok(true) => {}
            Ok(false) => tracing::debug!(
                "release timer for booking {} on equipment {} is stale",
                booking_id,
                equipment_id
            ),
            Err(e) => tracing::error!(
                "release timer for equipment {} failed: {}",
                equipment_id,
                e
            ),
        }
    }))
}
