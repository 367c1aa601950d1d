use crate::transport::{ApiRequest, Transport, TransportError};
use async_trait::async_trait;
use dontbe_core::ResponseEnvelope;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

enum Reply {
    Envelope(ResponseEnvelope<Value>),
    Fail(String),
}

/// Transport fake that replays queued replies and records every request.
///
/// When gated, each request parks until [`ScriptedTransport::release`] is
/// called, which lets tests observe in-flight state.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    calls: Mutex<Vec<(ApiRequest, String)>>,
    replies: Mutex<VecDeque<Reply>>,
    gate: Option<Notify>,
    called: Notify,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Some(Notify::new()),
            ..Self::default()
        })
    }

    pub(crate) fn reply(&self, status: u16, data: Value) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Envelope(ResponseEnvelope::new(status, "", Some(data))));
    }

    pub(crate) fn reply_status(&self, status: u16, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Envelope(ResponseEnvelope::bare(status, message)));
    }

    pub(crate) fn fail(&self, reason: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Fail(reason.to_string()));
    }

    /// Let one parked request continue.
    pub(crate) fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub(crate) async fn wait_for_calls(&self, count: usize) {
        while self.call_count() < count {
            self.called.notified().await;
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(request, _)| request.to_string())
            .collect()
    }

    pub(crate) fn last_request(&self) -> Option<ApiRequest> {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(request, _)| request.clone())
    }

    pub(crate) fn tokens(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, token)| token.clone())
            .collect()
    }

    pub(crate) fn bodies(&self) -> Vec<Option<Value>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(request, _)| request.body.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn request(
        &self,
        request: ApiRequest,
        token: &str,
    ) -> Result<ResponseEnvelope<Value>, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((request, token.to_string()));
        self.called.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Envelope(envelope)) => Ok(envelope),
            Some(Reply::Fail(reason)) => Err(TransportError::Unavailable(reason)),
            None => Err(TransportError::Unavailable("no scripted reply".to_string())),
        }
    }
}

/// Notification records with the given ids.
pub(crate) fn notifications(ids: &[i64]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| json!({"notificationId": id, "notificationType": "comment"}))
            .collect(),
    )
}
