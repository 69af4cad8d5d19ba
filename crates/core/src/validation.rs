//! Input validation utilities.
//!
//! Booking submissions come straight from a browser form. These functions turn the raw strings
//! into validated values before anything touches the booking store.

use crate::constants::{MAX_PATIENT_NAME_LEN, SLOT_TIME_FORMATS};
use crate::{BookingError, BookingResult};
use chrono::NaiveDateTime;
use evervault_types::NonEmptyText;

/// Validates a patient name.
///
/// The name is trimmed; it must then be non-empty and at most [`MAX_PATIENT_NAME_LEN`] characters.
///
/// # Errors
///
/// Returns `BookingError::InvalidInput` if the name is blank or too long.
pub fn validate_patient_name(name: &str) -> BookingResult<NonEmptyText> {
    let name = NonEmptyText::new(name)
        .map_err(|_| BookingError::InvalidInput("patientName cannot be empty".into()))?;

    if name.as_str().chars().count() > MAX_PATIENT_NAME_LEN {
        return Err(BookingError::InvalidInput(format!(
            "patientName exceeds maximum length of {} characters",
            MAX_PATIENT_NAME_LEN
        )));
    }

    Ok(name)
}

/// Parses an optional slot time as submitted by a `datetime-local` input.
///
/// `None` and blank strings mean "as soon as possible" and yield `Ok(None)`.
///
/// # Errors
///
/// Returns `BookingError::InvalidInput` if the value is present but matches none of
/// [`SLOT_TIME_FORMATS`].
pub fn parse_slot_time(raw: Option<&str>) -> BookingResult<Option<NaiveDateTime>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    SLOT_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(Some)
        .ok_or_else(|| {
            BookingError::InvalidInput(format!(
                "slotTime '{raw}' is not a date-time of the form YYYY-MM-DDTHH:MM"
            ))
        })
}

/// Rejects slot times that are not strictly after `now`.
///
/// # Errors
///
/// Returns `BookingError::PastSlotRejected` if `slot <= now`.
pub fn ensure_future_slot(slot: Option<NaiveDateTime>, now: NaiveDateTime) -> BookingResult<()> {
    match slot {
        Some(slot) if slot <= now => Err(BookingError::PastSlotRejected),
        _ => Ok(()),
    }
}

/// Formats a slot time for the wire, dropping seconds when they are zero.
pub fn format_slot_time(slot: NaiveDateTime) -> String {
    use chrono::Timelike;

    if slot.second() == 0 {
        slot.format(SLOT_TIME_FORMATS[1]).to_string()
    } else {
        slot.format(SLOT_TIME_FORMATS[0]).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_validate_patient_name_trims() {
        let name = validate_patient_name("  John Doe  ").unwrap();
        assert_eq!(name.as_str(), "John Doe");
    }

    #[test]
    fn test_validate_patient_name_rejects_empty() {
        let result = validate_patient_name("");
        match result {
            Err(BookingError::InvalidInput(msg)) => assert!(msg.contains("patientName")),
            _ => panic!("Expected InvalidInput error"),
        }
        assert!(validate_patient_name("   ").is_err());
    }

    #[test]
    fn test_validate_patient_name_rejects_too_long() {
        let long = "a".repeat(MAX_PATIENT_NAME_LEN + 1);
        assert!(validate_patient_name(&long).is_err());
        let max = "a".repeat(MAX_PATIENT_NAME_LEN);
        assert!(validate_patient_name(&max).is_ok());
    }

    #[test]
    fn test_parse_slot_time_accepts_minutes_and_seconds() {
        assert_eq!(
            parse_slot_time(Some("2026-02-14T10:30")).unwrap(),
            Some(at(2026, 2, 14, 10, 30))
        );
        assert_eq!(
            parse_slot_time(Some("2026-02-14T10:30:00")).unwrap(),
            Some(at(2026, 2, 14, 10, 30))
        );
    }

    #[test]
    fn test_parse_slot_time_blank_is_none() {
        assert_eq!(parse_slot_time(None).unwrap(), None);
        assert_eq!(parse_slot_time(Some("")).unwrap(), None);
        assert_eq!(parse_slot_time(Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_parse_slot_time_rejects_garbage() {
        assert!(matches!(
            parse_slot_time(Some("tomorrow morning")),
            Err(BookingError::InvalidInput(_))
        ));
        assert!(parse_slot_time(Some("2026-13-01T10:00")).is_err());
    }

    #[test]
    fn test_ensure_future_slot() {
        let now = at(2026, 2, 14, 10, 0);
        assert!(ensure_future_slot(None, now).is_ok());
        assert!(ensure_future_slot(Some(at(2026, 2, 14, 10, 1)), now).is_ok());
        assert!(matches!(
            ensure_future_slot(Some(now), now),
            Err(BookingError::PastSlotRejected)
        ));
        assert!(matches!(
            ensure_future_slot(Some(at(2025, 1, 1, 9, 0)), now),
            Err(BookingError::PastSlotRejected)
        ));
    }

    #[test]
    fn test_format_slot_time() {
        assert_eq!(format_slot_time(at(2026, 12, 31, 10, 0)), "2026-12-31T10:00");
        let with_secs = at(2026, 12, 31, 10, 0) + chrono::Duration::seconds(5);
        assert_eq!(format_slot_time(with_secs), "2026-12-31T10:00:05");
    }
}
