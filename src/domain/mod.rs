//! Core domain types for the mail relay

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transport kind for a mail service entry.
///
/// SMTP is the only supported transport and the default when omitted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    #[default]
    Smtp,
}

/// A named outbound mail-service configuration.
///
/// Loaded once at startup as part of the service mapping; immutable at
/// runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Transport kind (only `smtp` today)
    #[serde(default)]
    pub transport: TransportKind,

    /// SMTP server host
    pub host: String,

    /// SMTP server port (typically 587 for STARTTLS)
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Username for authentication (optional)
    pub username: Option<String>,

    /// Password for authentication (optional)
    pub password: Option<String>,

    /// Use STARTTLS encryption
    #[serde(default = "default_true")]
    pub use_tls: bool,

    /// From address; falls back to the transport account identity
    pub sender: Option<String>,

    /// Default headers applied to every message sent through this service
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl ServiceConfig {
    /// Effective sender address: explicit `sender`, else the account
    /// identity used to authenticate.
    pub fn sender_address(&self) -> Option<&str> {
        self.sender
            .as_deref()
            .or(self.username.as_deref())
            .filter(|s| !s.is_empty())
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_true() -> bool {
    true
}

/// Incoming send request, parsed from the JSON body of `POST /send`.
///
/// `headers` is kept as a raw JSON value so a malformed shape can be
/// reported as a header error instead of failing the whole parse.
#[derive(Debug, Clone, Deserialize)]
pub struct SendRequest {
    /// Recipient address
    pub user: String,
    /// Subject line
    #[serde(default)]
    pub title: Option<String>,
    /// Pre-rendered HTML body
    #[serde(default)]
    pub html: Option<String>,
    /// Plain text body
    #[serde(default)]
    pub text: Option<String>,
    /// Raw content; triggers theme rendering when html/text are absent
    #[serde(default)]
    pub content: Option<String>,
    /// Footer for rendered content
    #[serde(default)]
    pub footer: Option<String>,
    /// Theme name for rendered content
    #[serde(default)]
    pub theme: Option<String>,
    /// Force a specific service by name
    #[serde(default)]
    pub service: Option<String>,
    /// Carbon-copy addresses (comma-separated)
    #[serde(default)]
    pub cc: Option<String>,
    /// Blind carbon-copy addresses (comma-separated)
    #[serde(default)]
    pub bcc: Option<String>,
    /// Extra headers overlaid on the service defaults (request keys win)
    #[serde(default)]
    pub headers: Option<serde_json::Value>,
}

impl SendRequest {
    /// Subject, treating an empty string as absent.
    pub fn subject(&self) -> Option<&str> {
        non_empty(self.title.as_deref())
    }

    pub fn html_body(&self) -> Option<&str> {
        non_empty(self.html.as_deref())
    }

    pub fn text_body(&self) -> Option<&str> {
        non_empty(self.text.as_deref())
    }

    pub fn raw_content(&self) -> Option<&str> {
        non_empty(self.content.as_deref())
    }
}

/// Treat empty strings the way the wire format treats missing fields.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// A fully composed message, ready for a transport.
///
/// Produced per request and discarded after the dispatch attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    pub cc: Option<String>,
    pub bcc: Option<String>,
    pub headers: HashMap<String, String>,
}
