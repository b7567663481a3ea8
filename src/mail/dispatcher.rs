//! Mail dispatch flow: validate, render, select, send
//!
//! One transport is acquired per request and released after the single
//! send attempt, success or failure. Failures are surfaced to the caller;
//! there is no retry.

use crate::config::Config;
use crate::domain::{OutboundMessage, SendRequest, ServiceConfig};
use crate::error::{Result, SendError};
use crate::mail::selector::select_config;
use crate::mail::templates::TemplateStore;
use crate::mail::transport::{MailTransportFactory, TransportError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// The mail relay core: everything between a parsed request and a
/// completed dispatch attempt.
pub struct Mailer {
    services: HashMap<String, ServiceConfig>,
    default_footer: Option<String>,
    templates: TemplateStore,
    factory: Arc<dyn MailTransportFactory>,
}

impl Mailer {
    pub fn new(
        config: &Config,
        templates: TemplateStore,
        factory: Arc<dyn MailTransportFactory>,
    ) -> Self {
        Self {
            services: config.services.clone(),
            default_footer: config.default_footer.clone(),
            templates,
            factory,
        }
    }

    /// Run the full send flow for one request.
    ///
    /// Validation and header errors short-circuit before any I/O; render
    /// errors abort before a transport is acquired.
    pub async fn send(&self, request: &SendRequest) -> Result<()> {
        let subject = request.subject().ok_or(SendError::MissingTitle)?;

        // Select once so the header defaults and the dispatch target agree
        // even when the random fallback applies.
        let (name, config) = select_config(request, &self.services, &mut rand::thread_rng())?;
        let headers = merge_headers(&config.headers, request)?;

        let (html, text) = if request.html_body().is_some() || request.text_body().is_some() {
            (
                request.html_body().map(String::from),
                request.text_body().map(String::from),
            )
        } else if let Some(content) = request.raw_content() {
            let footer = request
                .footer
                .as_deref()
                .or(self.default_footer.as_deref())
                .unwrap_or("");
            let html = self
                .templates
                .render(request.theme.as_deref(), subject, content, footer)
                .await?;
            (Some(html), None)
        } else {
            return Err(SendError::MissingContent);
        };

        self.dispatch(request, name, config, subject, html, text, headers)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn dispatch(
        &self,
        request: &SendRequest,
        name: &str,
        config: &ServiceConfig,
        subject: &str,
        html: Option<String>,
        text: Option<String>,
        headers: HashMap<String, String>,
    ) -> Result<()> {
        let from = config.sender_address().ok_or_else(|| {
            TransportError::InvalidConfiguration(format!("service '{name}' has no sender address"))
        })?;

        let message = OutboundMessage {
            from: from.to_string(),
            to: request.user.clone(),
            subject: subject.to_string(),
            text,
            html,
            cc: request.cc.clone(),
            bcc: request.bcc.clone(),
            headers,
        };

        let transport = self.factory.create(config)?;
        let outcome = transport.send(&message).await;
        // Release the handle on both paths before surfacing the outcome.
        transport.close().await;
        outcome?;

        info!(service = name, to = %request.user, "mail dispatched");
        Ok(())
    }
}

/// Merge request headers over the service defaults; request keys win.
///
/// The request value arrives as raw JSON: anything but an object of
/// scalars is a header error, reported before any send attempt.
fn merge_headers(
    defaults: &HashMap<String, String>,
    request: &SendRequest,
) -> Result<HashMap<String, String>> {
    let mut headers = defaults.clone();

    if let Some(value) = &request.headers {
        let object = value
            .as_object()
            .ok_or_else(|| SendError::Headers("headers must be a JSON object".to_string()))?;

        for (key, value) in object {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(SendError::Headers(format!(
                        "header '{key}' must be a scalar value"
                    )))
                }
            };
            headers.insert(key.clone(), value);
        }
    }

    Ok(headers)
}
