//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Request
//! handling never reads process-wide environment variables, which keeps behaviour consistent in
//! multi-threaded runtimes and test harnesses.

use crate::catalogue::EquipmentCatalogue;
use crate::{BookingError, BookingResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How an `IN_USE` unit returns to `AVAILABLE` after a patient has been called.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReleasePolicy {
    /// Only an explicit release frees the unit.
    Manual,
    /// Free the unit once its buffer (procedure) time has elapsed.
    #[default]
    AfterBufferTime,
    /// Free the unit after a fixed delay, regardless of buffer time.
    After(Duration),
}

impl ReleasePolicy {
    /// Delay before an automatic release for a unit with the given buffer time, if any.
    pub fn delay_for(&self, buffer_minutes: u32) -> Option<Duration> {
        match self {
            ReleasePolicy::Manual => None,
            ReleasePolicy::AfterBufferTime => {
                Some(Duration::from_secs(u64::from(buffer_minutes) * 60))
            }
            ReleasePolicy::After(delay) => Some(*delay),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    equipment_file: Option<PathBuf>,
    release_policy: ReleasePolicy,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidInput` if `equipment_file` is given but is not a file.
    pub fn new(
        equipment_file: Option<PathBuf>,
        release_policy: ReleasePolicy,
    ) -> BookingResult<Self> {
        if let Some(path) = &equipment_file {
            if !path.is_file() {
                return Err(BookingError::InvalidInput(format!(
                    "equipment catalogue does not exist: {}",
                    path.display()
                )));
            }
        }

        Ok(Self {
            equipment_file,
            release_policy,
        })
    }

    pub fn equipment_file(&self) -> Option<&Path> {
        self.equipment_file.as_deref()
    }

    pub fn release_policy(&self) -> ReleasePolicy {
        self.release_policy
    }

    /// Load the configured equipment catalogue, or the built-in demo catalogue when no file is set.
    pub fn load_catalogue(&self) -> BookingResult<EquipmentCatalogue> {
        match &self.equipment_file {
            Some(path) => EquipmentCatalogue::from_file(path),
            None => EquipmentCatalogue::demo(),
        }
    }
}

/// Parse the release policy from an optional string value.
///
/// Accepts `manual`, `buffer`, or a whole number of seconds with an optional `s` suffix
/// (`8`, `8s`). `None` or blank selects [`ReleasePolicy::AfterBufferTime`].
pub fn release_policy_from_env_value(value: Option<String>) -> BookingResult<ReleasePolicy> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(ReleasePolicy::default());
    };

    match value.as_str() {
        "manual" => Ok(ReleasePolicy::Manual),
        "buffer" => Ok(ReleasePolicy::AfterBufferTime),
        other => {
            let digits = other.strip_suffix('s').unwrap_or(other);
            digits
                .parse::<u64>()
                .map(|secs| ReleasePolicy::After(Duration::from_secs(secs)))
                .map_err(|_| {
                    BookingError::InvalidInput(format!(
                        "release policy must be 'manual', 'buffer' or a number of seconds, got '{other}'"
                    ))
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_release_policy_defaults_to_buffer_time() {
        assert_eq!(
            release_policy_from_env_value(None).unwrap(),
            ReleasePolicy::AfterBufferTime
        );
        assert_eq!(
            release_policy_from_env_value(Some("  ".into())).unwrap(),
            ReleasePolicy::AfterBufferTime
        );
    }

    #[test]
    fn test_release_policy_parses_variants() {
        assert_eq!(
            release_policy_from_env_value(Some("Manual".into())).unwrap(),
            ReleasePolicy::Manual
        );
        assert_eq!(
            release_policy_from_env_value(Some("8s".into())).unwrap(),
            ReleasePolicy::After(Duration::from_secs(8))
        );
        assert_eq!(
            release_policy_from_env_value(Some("30".into())).unwrap(),
            ReleasePolicy::After(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_release_policy_rejects_garbage() {
        let err = release_policy_from_env_value(Some("soon".into())).unwrap_err();
        assert!(matches!(err, BookingError::InvalidInput(_)));
    }

    #[test]
    fn test_delay_for_policies() {
        assert_eq!(ReleasePolicy::Manual.delay_for(30), None);
        assert_eq!(
            ReleasePolicy::AfterBufferTime.delay_for(2),
            Some(Duration::from_secs(120))
        );
        assert_eq!(
            ReleasePolicy::After(Duration::from_secs(8)).delay_for(90),
            Some(Duration::from_secs(8))
        );
    }

    #[test]
    fn test_config_rejects_missing_catalogue_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = CoreConfig::new(Some(missing), ReleasePolicy::Manual).unwrap_err();
        assert!(matches!(err, BookingError::InvalidInput(_)));
    }

    #[test]
    fn test_config_loads_catalogue_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("equipment.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "- id: 7\n  name: MRI-Test\n  type: MRI\n  bufferTime: 60"
        )
        .unwrap();

        let cfg = CoreConfig::new(Some(path.clone()), ReleasePolicy::Manual).unwrap();
        assert_eq!(cfg.equipment_file(), Some(path.as_path()));
        let catalogue = cfg.load_catalogue().unwrap();
        assert_eq!(catalogue.entries().len(), 1);
        assert_eq!(catalogue.entries()[0].name.as_str(), "MRI-Test");
    }

    #[test]
    fn test_config_without_file_uses_demo_catalogue() {
        let cfg = CoreConfig::default();
        assert!(cfg.equipment_file().is_none());
        let catalogue = cfg.load_catalogue().unwrap();
        assert!(!catalogue.entries().is_empty());
    }
}
