//! Application configuration structures.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Only port supported by the mail relay, which speaks implicit TLS.
pub const SMTPS_PORT: u16 = 465;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and probing behavior settings
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// City slugs probed on every run, in scan order
    #[serde(default = "defaults::cities")]
    pub cities: Vec<String>,

    /// Local file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Report document settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Mail delivery settings
    #[serde(default)]
    pub mail: MailConfig,

    /// Remote archive settings
    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, or defaults when the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error: its
    /// `paths` may point at a different seen-set than the defaults do.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(AppError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("No config at {:?}. Using defaults.", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.tracker.user_agent.trim().is_empty() {
            return Err(AppError::validation("tracker.user_agent is empty"));
        }
        if self.tracker.timeout_secs == Some(0) {
            return Err(AppError::validation("tracker.timeout_secs must be > 0"));
        }
        if self.tracker.brand_token.trim().is_empty() {
            return Err(AppError::validation("tracker.brand_token is empty"));
        }
        Url::parse(&self.tracker.categories_url)?;
        Url::parse(&self.tracker.listing_base_url)?;
        if self.cities.is_empty() {
            return Err(AppError::validation("No cities defined"));
        }
        if let Some(city) = self.cities.iter().find(|c| c.trim().is_empty()) {
            return Err(AppError::validation(format!("Blank city slug: {city:?}")));
        }
        if self.mail.relay_host.trim().is_empty() {
            return Err(AppError::validation("mail.relay_host is empty"));
        }
        if self.mail.relay_port != SMTPS_PORT {
            return Err(AppError::validation(format!(
                "mail.relay_port must be {SMTPS_PORT} (implicit TLS), got {}",
                self.mail.relay_port
            )));
        }
        if self.archive.backend == ArchiveBackend::Drive {
            Url::parse(&self.archive.drive.token_url)?;
            Url::parse(&self.archive.drive.upload_url)?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            cities: defaults::cities(),
            paths: PathsConfig::default(),
            report: ReportConfig::default(),
            mail: MailConfig::default(),
            archive: ArchiveConfig::default(),
        }
    }
}

/// HTTP client and probing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds (unset means transport default)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Endpoint returning the category list
    #[serde(default = "defaults::categories_url")]
    pub categories_url: String,

    /// Base under which `<category>/<city>/` listing pages live
    #[serde(default = "defaults::listing_base_url")]
    pub listing_base_url: String,

    /// Case-insensitive token a live listing body must contain
    #[serde(default = "defaults::brand_token")]
    pub brand_token: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: None,
            categories_url: defaults::categories_url(),
            listing_base_url: defaults::listing_base_url(),
            brand_token: defaults::brand_token(),
        }
    }
}

/// Local file locations, relative paths resolve against the storage dir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::seen_file")]
    pub seen_file: PathBuf,

    #[serde(default = "defaults::report_dir")]
    pub report_dir: PathBuf,
}

impl PathsConfig {
    /// Absolute (or storage-relative) path of the seen-set file.
    pub fn seen_path(&self, storage_dir: &Path) -> PathBuf {
        storage_dir.join(&self.seen_file)
    }

    /// Directory receiving rendered reports.
    pub fn report_path(&self, storage_dir: &Path) -> PathBuf {
        storage_dir.join(&self.report_dir)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            seen_file: defaults::seen_file(),
            report_dir: defaults::report_dir(),
        }
    }
}

/// Report document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "defaults::report_title")]
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: defaults::report_title(),
        }
    }
}

/// Mail relay settings.
///
/// Credentials never live in the file; only the names of the environment
/// variables holding them do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "defaults::relay_host")]
    pub relay_host: String,

    /// Implicit-TLS (SMTPS) port; STARTTLS ports such as 587 are rejected
    #[serde(default = "defaults::relay_port")]
    pub relay_port: u16,

    #[serde(default = "defaults::subject")]
    pub subject: String,

    #[serde(default = "defaults::sender_env")]
    pub sender_env: String,

    #[serde(default = "defaults::password_env")]
    pub password_env: String,

    #[serde(default = "defaults::recipient_env")]
    pub recipient_env: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            relay_host: defaults::relay_host(),
            relay_port: defaults::relay_port(),
            subject: defaults::subject(),
            sender_env: defaults::sender_env(),
            password_env: defaults::password_env(),
            recipient_env: defaults::recipient_env(),
        }
    }
}

/// Which remote storage receives the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveBackend {
    #[default]
    Drive,
    S3,
}

/// Remote archive settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub backend: ArchiveBackend,

    #[serde(default)]
    pub drive: DriveConfig,

    #[serde(default)]
    pub s3: S3Config,
}

/// Google Drive upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// OAuth2 token endpoint for the refresh-token exchange
    #[serde(default = "defaults::drive_token_url")]
    pub token_url: String,

    /// Drive v3 media upload endpoint
    #[serde(default = "defaults::drive_upload_url")]
    pub upload_url: String,

    /// Optional parent folder ID
    #[serde(default)]
    pub folder_id: Option<String>,

    #[serde(default = "defaults::drive_client_id_env")]
    pub client_id_env: String,

    #[serde(default = "defaults::drive_client_secret_env")]
    pub client_secret_env: String,

    #[serde(default = "defaults::drive_refresh_token_env")]
    pub refresh_token_env: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            token_url: defaults::drive_token_url(),
            upload_url: defaults::drive_upload_url(),
            folder_id: None,
            client_id_env: defaults::drive_client_id_env(),
            client_secret_env: defaults::drive_client_secret_env(),
            refresh_token_env: defaults::drive_refresh_token_env(),
        }
    }
}

/// S3 upload settings (used with the `s3` feature).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    #[serde(default = "defaults::s3_bucket")]
    pub bucket: String,

    #[serde(default = "defaults::s3_prefix")]
    pub prefix: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: defaults::s3_bucket(),
            prefix: defaults::s3_prefix(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Tracker defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".into()
    }
    pub fn categories_url() -> String {
        "https://pl.booksy.com/api/pl_PL/categories".into()
    }
    pub fn listing_base_url() -> String {
        "https://booksy.com/pl-pl".into()
    }
    pub fn brand_token() -> String {
        "booksy".into()
    }

    pub fn cities() -> Vec<String> {
        [
            "warszawa",
            "krakow",
            "lodz",
            "wroclaw",
            "poznan",
            "gdansk",
            "szczecin",
            "bydgoszcz",
            "lublin",
            "bialystok",
            "katowice",
            "czestochowa",
            "radom",
            "kielce",
            "torun",
            "gliwice",
            "zabrze",
            "bytom",
            "rzeszow",
            "olsztyn",
            "bielsko-biala",
            "tarnow",
            "opole",
            "gorzow-wielkopolski",
            "zielona-gora",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    // Path defaults
    pub fn seen_file() -> PathBuf {
        PathBuf::from("seen_businesses.json")
    }
    pub fn report_dir() -> PathBuf {
        PathBuf::from("reports")
    }

    pub fn report_title() -> String {
        "Nowe biznesy na Booksy".into()
    }

    // Mail defaults
    pub fn relay_host() -> String {
        "smtp.gmail.com".into()
    }
    pub fn relay_port() -> u16 {
        super::SMTPS_PORT
    }
    pub fn subject() -> String {
        "Raport Booksy".into()
    }
    pub fn sender_env() -> String {
        "EMAIL_USER".into()
    }
    pub fn password_env() -> String {
        "EMAIL_PASS".into()
    }
    pub fn recipient_env() -> String {
        "EMAIL_TO".into()
    }

    // Archive defaults
    pub fn drive_token_url() -> String {
        "https://oauth2.googleapis.com/token".into()
    }
    pub fn drive_upload_url() -> String {
        "https://www.googleapis.com/upload/drive/v3/files".into()
    }
    pub fn drive_client_id_env() -> String {
        "GDRIVE_CLIENT_ID".into()
    }
    pub fn drive_client_secret_env() -> String {
        "GDRIVE_CLIENT_SECRET".into()
    }
    pub fn drive_refresh_token_env() -> String {
        "GDRIVE_REFRESH_TOKEN".into()
    }
    pub fn s3_bucket() -> String {
        "booksy-reports".into()
    }
    pub fn s3_prefix() -> String {
        "reports".into()
    }
}
