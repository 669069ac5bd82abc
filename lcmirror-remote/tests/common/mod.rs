#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use lcmirror_core::{SessionState, CSRF_COOKIE, SESSION_COOKIE};
use lcmirror_remote::{ApiClient, ApiRequest, ApiResponse, FetchError, RetryPolicy, Transport};

pub type Step = Result<ApiResponse, FetchError>;

/// Replays canned responses in order and records every request.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Step>>>,
    pub requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Arc::new(Mutex::new(steps.into())),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        request: &ApiRequest,
        _session: &SessionState,
    ) -> Result<ApiResponse, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted request: {request:?}"))
    }

    fn base_url(&self) -> &str {
        "https://leetcode.test"
    }
}

pub fn client(transport: &ScriptedTransport, attempts: u32, page_size: usize) -> ApiClient {
    ApiClient::new(
        Box::new(transport.clone()),
        RetryPolicy::immediate(attempts),
        page_size,
    )
}

pub fn status(code: u16) -> Step {
    Ok(ApiResponse {
        status: code,
        retry_after: None,
        body: String::new(),
    })
}

pub fn ok_json(value: serde_json::Value) -> Step {
    Ok(ApiResponse::ok(value.to_string()))
}

pub fn transport_error() -> Step {
    Err(FetchError::Transport {
        url: "https://leetcode.test".to_string(),
        message: "connection reset".to_string(),
    })
}

pub fn signed_in(yes: bool) -> Step {
    ok_json(serde_json::json!({ "data": { "userStatus": { "isSignedIn": yes } } }))
}

pub fn session(token: &str) -> SessionState {
    let mut cookies = BTreeMap::new();
    cookies.insert(SESSION_COOKIE.to_string(), token.to_string());
    cookies.insert(CSRF_COOKIE.to_string(), "csrf".to_string());
    SessionState::new(cookies)
}
