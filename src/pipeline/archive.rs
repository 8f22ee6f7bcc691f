// src/pipeline/archive.rs

//! Archive step: uploads the finished report to remote storage.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;

#[cfg(not(feature = "s3"))]
use crate::error::AppError;
use crate::error::Result;
use crate::models::{ArchiveBackend, ArchiveConfig};
use crate::storage::DriveArchiver;

/// Uploads a finished report to remote storage.
///
/// Archiving is independent of notification: a failed upload does not undo
/// a mail that was already sent.
#[async_trait]
pub trait Archiver: Send + Sync {
    async fn archive(&self, report: &Path) -> Result<()>;
}

/// Build the archiver selected in the configuration.
pub async fn archiver_from_config(
    config: &ArchiveConfig,
    client: &Client,
) -> Result<Box<dyn Archiver>> {
    match config.backend {
        ArchiveBackend::Drive => Ok(Box::new(DriveArchiver::new(
            client.clone(),
            config.drive.clone(),
        ))),
        #[cfg(feature = "s3")]
        ArchiveBackend::S3 => Ok(Box::new(
            crate::storage::S3Archiver::from_env(&config.s3).await?,
        )),
        #[cfg(not(feature = "s3"))]
        ArchiveBackend::S3 => Err(AppError::config(
            "archive.backend = \"s3\" requires the `s3` feature",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drive_backend_builds() {
        let config = ArchiveConfig::default();
        assert!(archiver_from_config(&config, &Client::new()).await.is_ok());
    }

    #[cfg(not(feature = "s3"))]
    #[tokio::test]
    async fn test_s3_backend_requires_feature() {
        let config = ArchiveConfig {
            backend: ArchiveBackend::S3,
            ..ArchiveConfig::default()
        };
        let result = archiver_from_config(&config, &Client::new()).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
