//! Shared test fixtures.
#![allow(dead_code)] // each test binary uses a different subset

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dyntable_lib::error::TransportError;
use dyntable_lib::http::{HttpRequest, HttpResponse, HttpTransport};

/// A scripted response step for [`MockTransport`].
pub enum Step {
    /// Respond with this status and body.
    Respond(u16, &'static str),
    /// Fail with a network error.
    Fail,
    /// Sleep this long before responding 200 (for timeout tests).
    Hang(Duration),
}

/// Records every request and replays a scripted response sequence.
///
/// Once the script runs out, every further request gets `200 {}`.
pub struct MockTransport {
    pub requests: Mutex<Vec<HttpRequest>>,
    script: Mutex<Vec<Step>>,
}

impl MockTransport {
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            script: Mutex::new(script),
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::new(Vec::new())
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> HttpRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let step = {
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                None
            } else {
                Some(script.remove(0))
            }
        };
        match step {
            None => Ok(HttpResponse {
                status: 200,
                body: "{}".to_string(),
            }),
            Some(Step::Respond(status, body)) => Ok(HttpResponse {
                status,
                body: body.to_string(),
            }),
            Some(Step::Fail) => Err(TransportError::Network("connection refused".to_string())),
            Some(Step::Hang(duration)) => {
                tokio::time::sleep(duration).await;
                Ok(HttpResponse {
                    status: 200,
                    body: "{}".to_string(),
                })
            }
        }
    }
}
