//! Google Drive archive backend.
//!
//! Uses the stored authorization of a Drive OAuth client: a long-lived
//! refresh token is exchanged for an access token on every upload, then the
//! report goes up in one `multipart/related` request (metadata + content).
//! Obtaining the refresh token (interactive consent) happens outside the
//! tracker.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::DriveConfig;
use crate::pipeline::Archiver;
use crate::utils::file_name;

/// OAuth client identity and refresh token.
#[derive(Clone)]
pub struct DriveCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for DriveCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

impl DriveCredentials {
    /// Resolve credentials through `lookup`, keyed by the configured names.
    pub fn from_lookup<F>(config: &DriveConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    AppError::upload(format!("authorization unavailable: {name} is not set"))
                })
        };

        Ok(Self {
            client_id: require(&config.client_id_env)?,
            client_secret: require(&config.client_secret_env)?,
            refresh_token: require(&config.refresh_token_env)?,
        })
    }

    pub fn from_env(config: &DriveConfig) -> Result<Self> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

/// Assemble a `multipart/related` body: JSON metadata, then raw content.
fn multipart_related(boundary: &str, metadata: &[u8], content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + content.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// Uploads reports to Google Drive.
pub struct DriveArchiver {
    client: Client,
    config: DriveConfig,
}

impl DriveArchiver {
    pub fn new(client: Client, config: DriveConfig) -> Self {
        Self { client, config }
    }

    /// Exchange the refresh token for a short-lived access token.
    async fn access_token(&self, credentials: &DriveCredentials) -> Result<String> {
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::upload(format!("authorization failed: {e}")))?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::upload(format!("authorization failed: {e}")))?;
        Ok(token.access_token)
    }

    /// Create a Drive file named `name` holding `content`; returns its ID.
    async fn upload(&self, access_token: &str, name: &str, content: &[u8]) -> Result<String> {
        let mut metadata = json!({ "name": name });
        if let Some(folder) = &self.config.folder_id {
            metadata["parents"] = json!([folder]);
        }
        let metadata = serde_json::to_vec(&metadata)?;

        let boundary = format!(
            "booksy-tracker-{}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        let body = multipart_related(&boundary, &metadata, content);

        let response = self
            .client
            .post(&self.config.upload_url)
            .query(&[("uploadType", "multipart")])
            .bearer_auth(access_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::upload(format!("transfer failed: {e}")))?;

        let file: UploadedFile = response
            .json()
            .await
            .map_err(|e| AppError::upload(format!("unexpected upload response: {e}")))?;
        Ok(file.id)
    }

    /// Authorize and upload `report`, returning the remote file ID.
    pub async fn archive_with(
        &self,
        credentials: &DriveCredentials,
        report: &Path,
    ) -> Result<String> {
        let name = file_name(report)
            .ok_or_else(|| AppError::upload(format!("no file name in {}", report.display())))?;
        let content = tokio::fs::read(report)
            .await
            .map_err(|e| AppError::upload(format!("cannot read {}: {}", report.display(), e)))?;

        let token = self.access_token(credentials).await?;
        let id = self.upload(&token, &name, &content).await?;

        log::info!("Report {} uploaded to Drive (file id {})", name, id);
        Ok(id)
    }
}

#[async_trait]
impl Archiver for DriveArchiver {
    async fn archive(&self, report: &Path) -> Result<()> {
        let credentials = DriveCredentials::from_env(&self.config)?;
        self.archive_with(&credentials, report).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> DriveCredentials {
        DriveCredentials {
            client_id: "client".into(),
            client_secret: "shh".into(),
            refresh_token: "refresh".into(),
        }
    }

    fn archiver_for(server: &MockServer, folder_id: Option<&str>) -> DriveArchiver {
        DriveArchiver::new(
            Client::new(),
            DriveConfig {
                token_url: format!("{}/token", server.uri()),
                upload_url: format!("{}/upload/drive/v3/files", server.uri()),
                folder_id: folder_id.map(String::from),
                ..DriveConfig::default()
            },
        )
    }

    fn write_report(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("booksy_report_20261016_0700.pdf");
        std::fs::write(&path, b"%PDF-1.3 report").unwrap();
        path
    }

    #[tokio::test]
    async fn test_refresh_then_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .and(query_param("uploadType", "multipart"))
            .and(header("authorization", "Bearer tok"))
            .and(body_string_contains("booksy_report_20261016_0700.pdf"))
            .and(body_string_contains("folder-1"))
            .and(body_string_contains("%PDF-1.3 report"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "file-123",
                "name": "booksy_report_20261016_0700.pdf"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let report = write_report(&tmp);

        let id = archiver_for(&server, Some("folder-1"))
            .archive_with(&credentials(), &report)
            .await
            .unwrap();
        assert_eq!(id, "file-123");

        server.verify().await;
    }

    #[tokio::test]
    async fn test_rejected_authorization_skips_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let report = write_report(&tmp);

        let err = archiver_for(&server, None)
            .archive_with(&credentials(), &report)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upload(_)));

        server.verify().await;
    }

    #[tokio::test]
    async fn test_failed_transfer_is_upload_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let report = write_report(&tmp);

        let err = archiver_for(&server, None)
            .archive_with(&credentials(), &report)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upload(_)));
    }

    #[test]
    fn test_missing_credentials_is_upload_error() {
        let err = DriveCredentials::from_lookup(&DriveConfig::default(), |_| None).unwrap_err();
        assert!(matches!(err, AppError::Upload(ref m) if m.contains("GDRIVE_CLIENT_ID")));
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let printed = format!("{:?}", credentials());
        assert!(printed.contains("client_id"));
        assert!(!printed.contains(&credentials().client_secret));
        assert!(!printed.contains(&credentials().refresh_token));
    }

    #[test]
    fn test_multipart_related_layout() {
        let body = multipart_related("b", br#"{"name":"r.pdf"}"#, b"PDF");
        let text = String::from_utf8(body).unwrap();
        assert_eq!(
            text,
            "--b\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{\"name\":\"r.pdf\"}\r\n--b\r\nContent-Type: application/pdf\r\n\r\nPDF\r\n--b--\r\n"
        );
    }
}
