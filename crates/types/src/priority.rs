use crate::TextError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Triage band of a booking.
///
/// Variants are declared in ascending urgency so the derived `Ord` ranks
/// `Emergency > Urgent > Normal`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[default]
    Normal,
    Urgent,
    Emergency,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Normal, Priority::Urgent, Priority::Emergency];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Normal => "NORMAL",
            Priority::Urgent => "URGENT",
            Priority::Emergency => "EMERGENCY",
        }
    }

    /// Parses a patient-supplied priority, falling back to `Normal` for anything unrecognised.
    ///
    /// Patients only express a wish; triage decides the real band, so a bad value here is not
    /// worth rejecting the booking over.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse::<Priority>().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Priority {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| TextError::UnknownVariant {
                kind: "priority",
                value: value.to_owned(),
            })
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
