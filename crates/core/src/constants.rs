//! Constants used throughout the EverVault core crate.

/// Environment variable holding the REST server address.
pub const REST_ADDR_ENV: &str = "EVERVAULT_REST_ADDR";

/// Default address for the REST server when [`REST_ADDR_ENV`] is not set.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8080";

/// Environment variable naming an optional YAML equipment catalogue.
pub const EQUIPMENT_FILE_ENV: &str = "EVERVAULT_EQUIPMENT_FILE";

/// Environment variable selecting the equipment release policy.
pub const RELEASE_POLICY_ENV: &str = "EVERVAULT_RELEASE";

/// Accepted slot-time layouts, most specific first. These match what an HTML
/// `datetime-local` input submits.
pub const SLOT_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Longest accepted patient name, in characters.
pub const MAX_PATIENT_NAME_LEN: usize = 200;

/// Next-slot label for a unit that can take a patient immediately.
pub const NEXT_SLOT_NOW: &str = "Now";

/// Next-slot label for a unit under maintenance.
pub const NEXT_SLOT_UNDER_REPAIR: &str = "Under Repair";

/// Next-slot label for a unit whose status is not known.
pub const NEXT_SLOT_UNKNOWN: &str = "Unknown";

/// Catalogue used when `EVERVAULT_EQUIPMENT_FILE` is not set.
pub const DEMO_CATALOGUE: &str = r#"
- id: 1
  name: MRI-1
  type: MRI
  bufferTime: 60
- id: 2
  name: CT-Scanner
  type: CT
  bufferTime: 30
- id: 3
  name: X-Ray Suite
  type: X-RAY
  bufferTime: 15
- id: 4
  name: Ultrasound
  type: ULTRASOUND
  bufferTime: 20
- id: 5
  name: PET-CT
  type: PET
  bufferTime: 90
  status: MAINTENANCE
"#;
