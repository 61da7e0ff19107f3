//! Common test utilities shared across the integration test files.
//!
//! Usage in test files:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use async_trait::async_trait;
use genai_dispatch::{AuthConfig, Client, Sleeper};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::MockServer;

/// Hostname the tests pretend the API lives at. Model subdomains under it
/// are resolved to the local mock server.
pub const TEST_HOST: &str = "genai.test";

/// A [`Sleeper`] that records requested delays and returns immediately, so
/// backoff tests assert exact schedules with zero wall-clock wait.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The delays requested so far, in order.
    pub fn recorded(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Builds a client whose model subdomains (`dialogue.genai.test`,
/// `content-creator.genai.test`) resolve to the mock server, preserving the
/// production URL shape end to end.
pub fn client_for(
    server: &MockServer,
    auth: AuthConfig,
    sleeper: Arc<RecordingSleeper>,
) -> Client {
    let addr = *server.address();
    let http = reqwest::Client::builder()
        .resolve(&format!("dialogue.{TEST_HOST}"), addr)
        .resolve(&format!("content-creator.{TEST_HOST}"), addr)
        .build()
        .expect("failed to build test HTTP client");

    Client::builder(auth)
        .host(format!("{TEST_HOST}:{}", addr.port()))
        .use_tls(false)
        .http_client(http)
        .sleeper(sleeper)
        .build()
        .expect("failed to build test client")
}
