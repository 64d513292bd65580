//! Scripted in-memory transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::transport::{HttpRequest, HttpResponse, Transport, TransportFailure};

/// Replays scripted outcomes in order and records each request.
#[derive(Debug, Default)]
pub(crate) struct StubTransport {
    outcomes: Mutex<VecDeque<Result<HttpResponse, TransportFailure>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new(outcomes: Vec<Result<HttpResponse, TransportFailure>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Convenience for a sequence of `(status, body)` responses.
    pub fn responding(responses: &[(u16, &str)]) -> Arc<Self> {
        Self::new(
            responses
                .iter()
                .map(|(status, body)| Ok(HttpResponse::new(*status, *body)))
                .collect(),
        )
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request.clone());
        }
        self.outcomes
            .lock()
            .ok()
            .and_then(|mut guard| guard.pop_front())
            .unwrap_or_else(|| {
                Err(TransportFailure::Connection {
                    message: String::from("no scripted response"),
                })
            })
    }
}
