//! Mail transport trait and SMTP implementation using lettre

use crate::domain::{OutboundMessage, ServiceConfig, TransportKind};
use async_trait::async_trait;
use lettre::{
    message::{
        header::{HeaderName, HeaderValue},
        Mailbox, MultiPart, SinglePart,
    },
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("message build failed: {0}")]
    Build(String),

    #[error("send failed: {0}")]
    SendFailed(String),
}

/// A handle to an outbound mail transport.
///
/// Acquired per request and released with [`close`](MailTransport::close)
/// after the single send attempt, success or failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one composed message.
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError>;

    /// Release the transport handle.
    async fn close(&self);
}

/// Builds a [`MailTransport`] for a selected service configuration.
///
/// This indirection keeps the dispatcher testable without a live SMTP
/// server.
#[cfg_attr(test, mockall::automock)]
pub trait MailTransportFactory: Send + Sync {
    fn create(&self, config: &ServiceConfig) -> Result<Box<dyn MailTransport>, TransportError>;
}

/// Production factory: one SMTP transport per dispatch.
pub struct SmtpTransportFactory;

impl MailTransportFactory for SmtpTransportFactory {
    fn create(&self, config: &ServiceConfig) -> Result<Box<dyn MailTransport>, TransportError> {
        match config.transport {
            TransportKind::Smtp => Ok(Box::new(SmtpMailTransport::from_config(config)?)),
        }
    }
}

/// SMTP transport backed by lettre.
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Create a transport from a service configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, TransportError> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| TransportError::InvalidConfiguration(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        builder = builder.port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    /// Build a lettre message from the composed outbound message.
    fn build_message(message: &OutboundMessage) -> Result<Message, TransportError> {
        let from: Mailbox = message
            .from
            .parse()
            .map_err(|_| TransportError::InvalidAddress(message.from.clone()))?;

        let mut builder = Message::builder().from(from).subject(&message.subject);

        for to in split_addresses(&message.to) {
            let mailbox: Mailbox = to
                .parse()
                .map_err(|_| TransportError::InvalidAddress(to.to_string()))?;
            builder = builder.to(mailbox);
        }

        if let Some(cc) = &message.cc {
            for cc in split_addresses(cc) {
                let mailbox: Mailbox = cc
                    .parse()
                    .map_err(|_| TransportError::InvalidAddress(cc.to_string()))?;
                builder = builder.cc(mailbox);
            }
        }

        if let Some(bcc) = &message.bcc {
            for bcc in split_addresses(bcc) {
                let mailbox: Mailbox = bcc
                    .parse()
                    .map_err(|_| TransportError::InvalidAddress(bcc.to_string()))?;
                builder = builder.bcc(mailbox);
            }
        }

        let mut email = match (&message.text, &message.html) {
            (Some(text), Some(html)) => builder
                .multipart(MultiPart::alternative_plain_html(
                    text.clone(),
                    html.clone(),
                ))
                .map_err(|e| TransportError::Build(e.to_string()))?,
            (None, Some(html)) => builder
                .singlepart(SinglePart::html(html.clone()))
                .map_err(|e| TransportError::Build(e.to_string()))?,
            (Some(text), None) => builder
                .body(text.clone())
                .map_err(|e| TransportError::Build(e.to_string()))?,
            (None, None) => {
                return Err(TransportError::Build("message has no body".to_string()))
            }
        };

        for (name, value) in &message.headers {
            let header = HeaderName::new_from_ascii(name.clone())
                .map_err(|e| TransportError::Build(format!("invalid header '{name}': {e}")))?;
            email
                .headers_mut()
                .insert_raw(HeaderValue::new(header, value.clone()));
        }

        Ok(email)
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        let email = Self::build_message(message)?;

        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&self) {
        // Without connection pooling each send opens and closes its own
        // SMTP session; nothing is left to tear down here.
    }
}

fn split_addresses(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}
