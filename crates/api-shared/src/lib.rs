//! # API Shared
//!
//! Shared utilities and definitions for EverVault APIs.
//!
//! Contains:
//! - JSON wire types (`dto` module) with their OpenAPI schemas
//! - Conversions from core records into wire types
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the CLI for common functionality.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
