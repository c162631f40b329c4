//! Testing utilities for the pw workspace
//!
//! Shared fakes and fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use pw_model::{AuthToken, AutocompleteConfig, FieldDescriptor, FieldValue, RecordId, RefValue, RequestContext};
use pw_remote::{HttpRequest, HttpResponse, Transport, TransportError};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;

type Reply = Result<HttpResponse, TransportError>;

#[derive(Debug)]
enum Scripted {
    Ready(Reply),
    Gated(oneshot::Receiver<Reply>),
}

#[derive(Debug, Default)]
struct Script {
    requests: Vec<HttpRequest>,
    replies: VecDeque<Scripted>,
}

/// In-memory transport: records every request and answers from a FIFO script
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<Script>>,
}

/// Held-back reply; the matching request waits until the gate is opened
#[derive(Debug)]
pub struct Gate {
    sender: oneshot::Sender<Reply>,
}

impl Gate {
    pub fn open(self, reply: Reply) {
        let _ = self.sender.send(reply);
    }

    pub fn open_json(self, status: u16, body: Value) {
        self.open(Ok(HttpResponse::json(status, &body)));
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Reply) {
        self.inner.lock().replies.push_back(Scripted::Ready(reply));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(Ok(HttpResponse::json(status, &body)));
    }

    pub fn push_status(&self, status: u16, body: &str) {
        self.push(Ok(HttpResponse::new(status, body)));
    }

    pub fn push_error(&self, error: TransportError) {
        self.push(Err(error));
    }

    pub fn push_gated(&self) -> Gate {
        let (sender, receiver) = oneshot::channel();
        self.inner.lock().replies.push_back(Scripted::Gated(receiver));
        Gate { sender }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().requests.len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.inner.lock().requests.last().cloned()
    }

    pub fn pending_replies(&self) -> usize {
        self.inner.lock().replies.len()
    }

    pub fn as_transport(&self) -> Arc<dyn Transport> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let next = {
            let mut script = self.inner.lock();
            script.requests.push(request);
            script.replies.pop_front()
        };
        match next {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Gated(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err(TransportError::Request("gate dropped".to_string()))),
            None => Err(TransportError::Connect("no scripted reply".to_string())),
        }
    }
}

pub const RECORD_ID: RecordId = RecordId(42);

pub fn test_context() -> RequestContext {
    RequestContext::new(RECORD_ID, AuthToken::new("csrf-token"))
}

pub fn users_autocomplete() -> AutocompleteConfig {
    AutocompleteConfig::new("/complete_user", "name").with_search_attributes(["name", "email"])
}

pub fn reviewer_field() -> FieldDescriptor {
    FieldDescriptor::reference("reviewer", users_autocomplete())
}

pub fn reviewer_field_with(id: i64, name: &str) -> FieldDescriptor {
    reviewer_field().with_value(FieldValue::Reference(RefValue::new(id, name)))
}

pub fn alice() -> RefValue {
    RefValue::new(7, "Alice")
}

pub fn series_record(reviewer: Value) -> Value {
    json!({
        "id": RECORD_ID.0,
        "name": "[PATCH 0/3] drm/i915: fix leak",
        "n_patches": 3,
        "submitter": 11,
        "submitter__name": "Dave",
        "submitted": "2015-08-21T14:02:11.123",
        "last_updated": "2015-08-22T09:30:00",
        "version": 1,
        "reviewer": reviewer,
    })
}

pub fn user_candidates() -> Value {
    json!([
        {"pk": 7, "name": "Alice", "email": "alice@example.org"},
        {"pk": 8, "name": "Alicia", "email": "alicia@example.org"},
    ])
}
