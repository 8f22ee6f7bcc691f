// src/models/mod.rs

//! Domain models for the tracker.

mod config;
mod discovery;

// Re-export all public types
pub use config::{
    ArchiveBackend, ArchiveConfig, Config, DriveConfig, MailConfig, PathsConfig, ReportConfig,
    S3Config, TrackerConfig,
};
pub use discovery::{Combination, DiscoveryEntry, Liveness, SeenSet};
