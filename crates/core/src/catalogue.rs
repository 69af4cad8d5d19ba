//! Equipment catalogue loading.
//!
//! The catalogue is the bootstrap source for the [`EquipmentRegistry`](crate::EquipmentRegistry).
//! It is a YAML sequence of units:
//!
//! ```yaml
//! - id: 1
//!   name: MRI-1
//!   type: MRI
//!   bufferTime: 60
//! - id: 5
//!   name: PET-CT
//!   type: PET
//!   bufferTime: 90
//!   status: MAINTENANCE
//! ```
//!
//! `status` is optional and defaults to `AVAILABLE`.

use crate::constants::DEMO_CATALOGUE;
use crate::{BookingError, BookingResult};
use evervault_types::{EquipmentId, EquipmentStatus, NonEmptyText};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

fn default_status() -> EquipmentStatus {
    EquipmentStatus::Available
}

/// One equipment unit as declared in the catalogue.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EquipmentSpec {
    pub id: EquipmentId,
    pub name: NonEmptyText,
    #[serde(rename = "type")]
    pub kind: NonEmptyText,
    /// Procedure duration in minutes.
    pub buffer_time: u32,
    #[serde(default = "default_status")]
    pub status: EquipmentStatus,
}

/// A validated list of equipment units with unique ids and non-zero buffer times.
#[derive(Clone, Debug)]
pub struct EquipmentCatalogue {
    entries: Vec<EquipmentSpec>,
}

impl EquipmentCatalogue {
    /// Validate and wrap a list of specs.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidCatalogue` if the list is empty, an id appears twice, or a
    /// unit declares a zero buffer time.
    pub fn new(entries: Vec<EquipmentSpec>) -> BookingResult<Self> {
        if entries.is_empty() {
            return Err(BookingError::InvalidCatalogue(
                "catalogue must declare at least one unit".into(),
            ));
        }

        let mut seen = BTreeSet::new();
        for spec in &entries {
            if !seen.insert(spec.id) {
                return Err(BookingError::InvalidCatalogue(format!(
                    "duplicate equipment id {}",
                    spec.id
                )));
            }
            if spec.buffer_time == 0 {
                return Err(BookingError::InvalidCatalogue(format!(
                    "{} (id {}) must have a buffer time above zero",
                    spec.name, spec.id
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Parse a catalogue from YAML text.
    pub fn from_yaml(raw: &str) -> BookingResult<Self> {
        let entries: Vec<EquipmentSpec> = serde_yaml::from_str(raw)?;
        Self::new(entries)
    }

    /// Read and parse a catalogue file.
    pub fn from_file(path: &Path) -> BookingResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| BookingError::CatalogueRead {
            path: path.to_path_buf(),
            source,
        })?;
        let catalogue = Self::from_yaml(&raw)?;
        tracing::debug!(
            "loaded {} equipment units from {}",
            catalogue.entries.len(),
            path.display()
        );
        Ok(catalogue)
    }

    /// The built-in catalogue used when no file is configured.
    pub fn demo() -> BookingResult<Self> {
        Self::from_yaml(DEMO_CATALOGUE)
    }

    pub fn entries(&self) -> &[EquipmentSpec] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<EquipmentSpec> {
        self.entries
    }
}
