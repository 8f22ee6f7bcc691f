//! AWS S3 archive backend.
//!
//! Reports are stored as `{bucket}/{prefix}/booksy_report_YYYYMMDD_HHMM.pdf`.
//! Credentials and region come from the standard AWS environment chain.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::models::S3Config;
use crate::pipeline::Archiver;
use crate::utils::file_name;

/// S3-based report archive.
pub struct S3Archiver {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Archiver {
    /// Create a new S3 archiver instance.
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Create an S3 archiver from the AWS environment configuration.
    pub async fn from_env(config: &S3Config) -> Result<Self> {
        let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&aws);

        let bucket = std::env::var("S3_BUCKET").unwrap_or_else(|_| config.bucket.clone());
        let prefix = std::env::var("S3_PREFIX").unwrap_or_else(|_| config.prefix.clone());

        Ok(Self::new(client, bucket, prefix))
    }

    /// Object key for a report file name.
    fn key(&self, name: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", prefix, name)
        }
    }
}

#[async_trait]
impl Archiver for S3Archiver {
    async fn archive(&self, report: &Path) -> Result<()> {
        let name = file_name(report)
            .ok_or_else(|| AppError::upload(format!("no file name in {}", report.display())))?;
        let key = self.key(&name);

        let body = ByteStream::from_path(report)
            .await
            .map_err(|e| AppError::upload(format!("cannot read {}: {}", report.display(), e)))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .content_type("application/pdf")
            .send()
            .await
            .map_err(|e| AppError::upload(e.into_service_error()))?;

        log::info!("Report uploaded to s3://{}/{}", self.bucket, key);
        Ok(())
    }
}
