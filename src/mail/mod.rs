//! Mail relay core: templates, selection, transport, dispatch

pub mod dispatcher;
pub mod selector;
pub mod templates;
pub mod transport;

pub use dispatcher::Mailer;
pub use selector::select_config;
pub use templates::TemplateStore;
pub use transport::{MailTransport, MailTransportFactory, SmtpTransportFactory};
