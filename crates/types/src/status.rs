use crate::TextError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Operational status of an equipment unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    Available,
    InUse,
    /// Out of service; the unit cannot be booked.
    Maintenance,
    #[default]
    Unknown,
}

impl EquipmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentStatus::Available => "AVAILABLE",
            EquipmentStatus::InUse => "IN_USE",
            EquipmentStatus::Maintenance => "MAINTENANCE",
            EquipmentStatus::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for EquipmentStatus {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(EquipmentStatus::Available),
            "IN_USE" => Ok(EquipmentStatus::InUse),
            "MAINTENANCE" => Ok(EquipmentStatus::Maintenance),
            "UNKNOWN" => Ok(EquipmentStatus::Unknown),
            other => Err(TextError::UnknownVariant {
                kind: "equipment status",
                value: other.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a booking request.
///
/// The only legal path is `Pending -> Queued -> Served`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingState {
    Pending,
    Queued,
    Served,
}

impl BookingState {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingState::Pending => "PENDING",
            BookingState::Queued => "QUEUED",
            BookingState::Served => "SERVED",
        }
    }
}

impl std::fmt::Display for BookingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
