//! Next-slot estimation.
//!
//! Produces the `nextAvailable` label shown next to each unit. The label is always a plain string
//! so consumers never have to deal with a missing value.

use crate::constants::{NEXT_SLOT_NOW, NEXT_SLOT_UNDER_REPAIR, NEXT_SLOT_UNKNOWN};
use crate::registry::Equipment;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use evervault_types::EquipmentStatus;

/// Upper bound on the projected backlog; keeps the arithmetic far from chrono's limits.
const MAX_BACKLOG_MINUTES: i64 = 60 * 24 * 366;

/// Estimate when a unit can take its next new patient, in local `HH:MM`.
pub fn next_available(equipment: &Equipment, queue_length: usize, now: DateTime<Utc>) -> String {
    next_available_in(equipment, queue_length, now, &Local)
}

/// As [`next_available`], rendering the time in `tz`.
///
/// The estimate is `max(now, busy_until) + queue_length * buffer_time`. A unit that is free and
/// has nobody waiting is available `"Now"`.
pub fn next_available_in<Tz: TimeZone>(
    equipment: &Equipment,
    queue_length: usize,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match equipment.status {
        EquipmentStatus::Maintenance => return NEXT_SLOT_UNDER_REPAIR.to_owned(),
        EquipmentStatus::Unknown => return NEXT_SLOT_UNKNOWN.to_owned(),
        EquipmentStatus::Available | EquipmentStatus::InUse => {}
    }

    let busy_until = match equipment.status {
        EquipmentStatus::InUse => equipment.busy_until.filter(|until| *until > now),
        _ => None,
    };

    if queue_length == 0 && busy_until.is_none() {
        return NEXT_SLOT_NOW.to_owned();
    }

    let waiting = i64::try_from(queue_length).unwrap_or(i64::MAX);
    let backlog_minutes = i64::from(equipment.buffer_time)
        .saturating_mul(waiting)
        .min(MAX_BACKLOG_MINUTES);
    let backlog = Duration::minutes(backlog_minutes);
    let start = busy_until.unwrap_or(now);
    let next = start.checked_add_signed(backlog).unwrap_or(start);

    next.with_timezone(tz).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use evervault_types::{BookingId, EquipmentId, NonEmptyText};

    fn unit(status: EquipmentStatus, buffer_time: u32) -> Equipment {
        Equipment {
            id: EquipmentId::new(1),
            name: NonEmptyText::new("MRI-1").unwrap(),
            kind: NonEmptyText::new("MRI").unwrap(),
            status,
            buffer_time,
            current_booking: None,
            busy_until: None,
        }
    }

    fn ten_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 14, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_idle_unit_is_available_now() {
        let eq = unit(EquipmentStatus::Available, 60);
        assert_eq!(next_available_in(&eq, 0, ten_am(), &Utc), "Now");
    }

    #[test]
    fn test_queue_backlog_is_added() {
        let eq = unit(EquipmentStatus::Available, 30);
        assert_eq!(next_available_in(&eq, 3, ten_am(), &Utc), "11:30");
    }

    #[test]
    fn test_busy_unit_starts_after_current_procedure() {
        let mut eq = unit(EquipmentStatus::InUse, 60);
        eq.current_booking = Some(BookingId::new(1));
        eq.busy_until = Some(ten_am() + Duration::minutes(45));

        assert_eq!(next_available_in(&eq, 0, ten_am(), &Utc), "10:45");
        assert_eq!(next_available_in(&eq, 1, ten_am(), &Utc), "11:45");
    }

    #[test]
    fn test_overrun_busy_time_is_ignored() {
        let mut eq = unit(EquipmentStatus::InUse, 20);
        eq.busy_until = Some(ten_am() - Duration::minutes(5));
        assert_eq!(next_available_in(&eq, 0, ten_am(), &Utc), "Now");
    }

    #[test]
    fn test_maintenance_and_unknown_labels() {
        assert_eq!(
            next_available_in(&unit(EquipmentStatus::Maintenance, 60), 2, ten_am(), &Utc),
            "Under Repair"
        );
        assert_eq!(
            next_available_in(&unit(EquipmentStatus::Unknown, 60), 0, ten_am(), &Utc),
            "Unknown"
        );
    }
}
