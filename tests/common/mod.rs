//! Common test utilities

use async_trait::async_trait;
use pigeon::config::Config;
use pigeon::domain::{OutboundMessage, ServiceConfig, TransportKind};
use pigeon::mail::transport::{MailTransport, MailTransportFactory, TransportError};
use pigeon::server::{build_router, build_state};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const TEST_SECRET: &str = "test-secret";

/// Transport that records messages instead of speaking SMTP.
struct RecordingTransport {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    fail_send: bool,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail_send {
            Err(TransportError::SendFailed("recipient refused".to_string()))
        } else {
            Ok(())
        }
    }

    async fn close(&self) {}
}

pub struct RecordingFactory {
    pub sent: Arc<Mutex<Vec<OutboundMessage>>>,
    pub fail_send: bool,
}

impl MailTransportFactory for RecordingFactory {
    fn create(&self, _config: &ServiceConfig) -> Result<Box<dyn MailTransport>, TransportError> {
        Ok(Box::new(RecordingTransport {
            sent: self.sent.clone(),
            fail_send: self.fail_send,
        }))
    }
}

fn service(host: &str, user: &str) -> ServiceConfig {
    ServiceConfig {
        transport: TransportKind::Smtp,
        host: host.to_string(),
        port: 587,
        username: Some(user.to_string()),
        password: Some("password".to_string()),
        use_tls: true,
        sender: None,
        headers: HashMap::new(),
    }
}

fn test_config() -> Config {
    let mut services = HashMap::new();
    services.insert("qq".to_string(), service("smtp.qq.com", "relay@qq.com"));
    services.insert(
        "gmail".to_string(),
        service("smtp.gmail.com", "relay@gmail.com"),
    );

    Config {
        http_host: "127.0.0.1".to_string(),
        http_port: 0,
        secret: TEST_SECRET.to_string(),
        services,
        // Use the crate's real themes so rendering is covered end to end.
        template_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates"),
        default_footer: None,
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub sent: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl TestApp {
    /// Spin up the router on an ephemeral port with a recording transport.
    pub async fn spawn() -> Self {
        Self::spawn_with(false).await
    }

    pub async fn spawn_with(fail_send: bool) -> Self {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let factory = Arc::new(RecordingFactory {
            sent: sent.clone(),
            fail_send,
        });

        let state = build_state(test_config(), factory);
        let app = build_router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: reqwest::Client::new(),
            sent,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}
