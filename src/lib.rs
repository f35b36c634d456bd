//! GDPR reporting for a Dataiku DSS instance
//!
//! Two HTML reports are built from the platform's REST API: a GDPR audit of
//! connections, projects and data assets, and a dataset check-up listing
//! datasets whose GDPR documentation is incomplete.

pub mod config;
pub mod core;
pub mod platform;
pub mod reporting;
pub mod ui;

// Re-export commonly used items for convenience
pub use config::{CliConfig, Config};
pub use core::{Classification, DatasetRef, GdprError, ProgressTarget, Result};
pub use platform::{DssClient, PlatformApi};
pub use reporting::{
    AuditReport, AuditSections, CheckupReport, ProgressCallback, ProgressSchedule, ProjectScope,
    Report,
};
