// src/pipeline/notify.rs

//! Mail notification with the report attached.

use std::path::Path;

use async_trait::async_trait;
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::Code;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::{AppError, Result};
use crate::models::MailConfig;
use crate::utils::file_name;

/// SMTP reply code for rejected credentials.
const AUTH_REJECTED: &str = "535";

/// Delivers a finished report.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, report: &Path) -> Result<()>;
}

/// Sender identity, secret and recipient for one delivery.
#[derive(Clone)]
pub struct MailCredentials {
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl MailCredentials {
    /// Resolve credentials through `lookup`, keyed by the configured names.
    pub fn from_lookup<F>(config: &MailConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    AppError::config(format!("environment variable {name} is not set"))
                })
        };

        Ok(Self {
            sender: require(&config.sender_env)?,
            password: require(&config.password_env)?,
            recipient: require(&config.recipient_env)?,
        })
    }

    /// Resolve credentials from the process environment.
    pub fn from_env(config: &MailConfig) -> Result<Self> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }
}

/// Build the message carrying `content` as a base64 octet-stream attachment.
pub fn build_message(
    credentials: &MailCredentials,
    subject: &str,
    attachment_name: &str,
    content: Vec<u8>,
) -> Result<Message> {
    let from: Mailbox = credentials
        .sender
        .parse()
        .map_err(|e| AppError::config(format!("invalid sender address: {e}")))?;
    let to: Mailbox = credentials
        .recipient
        .parse()
        .map_err(|e| AppError::config(format!("invalid recipient address: {e}")))?;

    let content_type = ContentType::parse("application/octet-stream")
        .map_err(|e| AppError::transport(format!("content type: {e}")))?;
    let body = Body::new_with_encoding(content, ContentTransferEncoding::Base64)
        .map_err(|_| AppError::transport("attachment cannot be base64 encoded"))?;
    let attachment = Attachment::new(attachment_name.to_string()).body(body, content_type);

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(MultiPart::mixed().singlepart(attachment))
        .map_err(AppError::transport)
}

/// Classify a failed delivery by the relay's reply code, if any.
fn send_error(status: Option<Code>, message: impl std::fmt::Display) -> AppError {
    if status.is_some_and(|code| code.to_string() == AUTH_REJECTED) {
        AppError::auth(message)
    } else {
        AppError::transport(message)
    }
}

/// Sends the report over SMTPS using credentials from the environment.
pub struct SmtpNotifier {
    config: MailConfig,
}

impl SmtpNotifier {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, report: &Path) -> Result<()> {
        let credentials = MailCredentials::from_env(&self.config)?;

        let name = file_name(report)
            .ok_or_else(|| AppError::transport(format!("no file name in {}", report.display())))?;
        let content = tokio::fs::read(report).await?;
        let message = build_message(&credentials, &self.config.subject, &name, content)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.relay_host)
            .map_err(AppError::transport)?
            .port(self.config.relay_port)
            .credentials(Credentials::new(
                credentials.sender.clone(),
                credentials.password.clone(),
            ))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| send_error(e.status(), e))?;

        log::info!(
            "Report {} mailed to {} via {}:{}",
            name,
            credentials.recipient,
            self.config.relay_host,
            self.config.relay_port
        );
        Ok(())
    }
}
