//! Scripted in-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use bytes::Bytes;
use serde_json::{Value, json};

use crate::credential::AccessCredential;
use crate::provider::{
    CreateLinkArg, ListLinksArg, ProviderReply, ProviderTransport, RefreshGrant, TransportError,
    UploadArg,
};

type Scripted = Mutex<VecDeque<Result<ProviderReply, TransportError>>>;

/// A recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Token { client_id: String },
    Upload { path: String, bearer: String, bytes: usize },
    CreateLink { path: String },
    ListLinks { path: String },
}

/// Transport that replays scripted replies and records every call.
#[derive(Default)]
pub(crate) struct FakeTransport {
    tokens: Scripted,
    uploads: Scripted,
    creates: Scripted,
    lists: Scripted,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn token(self, reply: Result<ProviderReply, TransportError>) -> Self {
        push(&self.tokens, reply);
        self
    }

    pub(crate) fn upload(self, reply: Result<ProviderReply, TransportError>) -> Self {
        push(&self.uploads, reply);
        self
    }

    pub(crate) fn create(self, reply: Result<ProviderReply, TransportError>) -> Self {
        push(&self.creates, reply);
        self
    }

    pub(crate) fn list(self, reply: Result<ProviderReply, TransportError>) -> Self {
        push(&self.lists, reply);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

fn push(queue: &Scripted, reply: Result<ProviderReply, TransportError>) {
    queue.lock().expect("script lock").push_back(reply);
}

fn next(queue: &Scripted, what: &str) -> Result<ProviderReply, TransportError> {
    queue
        .lock()
        .expect("script lock")
        .pop_front()
        .unwrap_or_else(|| Err(TransportError::request(format!("unscripted {what} call"))))
}

impl ProviderTransport for FakeTransport {
    async fn exchange_refresh_token(
        &self,
        grant: &RefreshGrant<'_>,
    ) -> Result<ProviderReply, TransportError> {
        self.record(Call::Token {
            client_id: grant.client_id.to_string(),
        });
        next(&self.tokens, "token")
    }

    async fn upload(
        &self,
        credential: &AccessCredential,
        arg: &UploadArg,
        payload: Bytes,
    ) -> Result<ProviderReply, TransportError> {
        self.record(Call::Upload {
            path: arg.path.clone(),
            bearer: credential.bearer().to_string(),
            bytes: payload.len(),
        });
        next(&self.uploads, "upload")
    }

    async fn create_shared_link(
        &self,
        _credential: &AccessCredential,
        arg: &CreateLinkArg,
    ) -> Result<ProviderReply, TransportError> {
        self.record(Call::CreateLink {
            path: arg.path.clone(),
        });
        next(&self.creates, "create_shared_link")
    }

    async fn list_shared_links(
        &self,
        _credential: &AccessCredential,
        arg: &ListLinksArg,
    ) -> Result<ProviderReply, TransportError> {
        self.record(Call::ListLinks {
            path: arg.path.clone(),
        });
        next(&self.lists, "list_shared_links")
    }
}

pub(crate) fn ok(body: Value) -> Result<ProviderReply, TransportError> {
    Ok(ProviderReply::new(200, body))
}

pub(crate) fn status(code: u16, body: Value) -> Result<ProviderReply, TransportError> {
    Ok(ProviderReply::new(code, body))
}

pub(crate) fn token_ok(token: &str) -> Result<ProviderReply, TransportError> {
    ok(json!({ "access_token": token, "token_type": "bearer", "expires_in": 14400 }))
}

pub(crate) fn upload_ok(path_lower: &str) -> Result<ProviderReply, TransportError> {
    ok(json!({
        "id": format!("id:{path_lower}"),
        "path_lower": path_lower,
        "path_display": path_lower,
    }))
}

pub(crate) fn link_ok(url: &str) -> Result<ProviderReply, TransportError> {
    ok(json!({ "url": url, ".tag": "file" }))
}

pub(crate) fn link_exists() -> Result<ProviderReply, TransportError> {
    status(
        409,
        json!({
            "error_summary": "shared_link_already_exists/metadata/..",
            "error": { ".tag": "shared_link_already_exists" }
        }),
    )
}
