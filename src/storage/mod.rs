//! Storage backends.
//!
//! - Seen-set persistence: [`SeenStore`], backed by a flat JSON file
//!   ([`JsonSeenStore`]) or by memory ([`MemorySeenStore`]).
//! - Report archiving: Google Drive ([`DriveArchiver`]) and, with the `s3`
//!   feature, S3 (`S3Archiver`).
//!
//! ## Layout
//!
//! ```text
//! storage/
//! ├── config.toml              # Tracker configuration
//! ├── seen_businesses.json     # Seen-set: ["warszawa-fryzjer", ...]
//! └── reports/
//!     └── booksy_report_20261016_0700.pdf
//! ```

pub mod drive;
pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SeenSet;

// Re-export for convenience
pub use drive::DriveArchiver;
pub use local::JsonSeenStore;
pub use memory::MemorySeenStore;
#[cfg(feature = "s3")]
pub use s3::S3Archiver;

/// Trait for seen-set persistence backends.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Load the persisted set, or an empty set when nothing was stored yet.
    async fn load(&self) -> Result<SeenSet>;

    /// Replace the persisted set with `seen`.
    async fn save(&self, seen: &SeenSet) -> Result<()>;
}
