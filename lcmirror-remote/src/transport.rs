//! Blocking HTTP seam.
//!
//! [`Transport`] is the only place that touches the network. Production code
//! uses [`HttpTransport`] (ureq); tests script responses with a fake.

use std::time::Duration;

use lcmirror_core::SessionState;
use serde_json::Value;

use crate::error::FetchError;

const USER_AGENT: &str = concat!("lcmirror/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    /// `GET <base><path>`; `path` carries the query string.
    Get { path: String },
    /// `POST <base><path>` with a JSON body.
    PostJson { path: String, body: Value },
}

impl ApiRequest {
    pub fn path(&self) -> &str {
        match self {
            ApiRequest::Get { path } | ApiRequest::PostJson { path, .. } => path,
        }
    }
}

/// Any HTTP response, successful or not. Status handling is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed `Retry-After` header (delta-seconds form only).
    pub retry_after: Option<Duration>,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport {
    /// Send one request with the session's cookies.
    ///
    /// Returns `Err` only for failures below HTTP (connect, TLS, timeout);
    /// every status code comes back as `Ok`.
    fn send(&self, request: &ApiRequest, session: &SessionState) -> Result<ApiResponse, FetchError>;

    /// Base URL, used for error messages.
    fn base_url(&self) -> &str;
}

// ---------------------------------------------------------------------------
// ureq
// ---------------------------------------------------------------------------

pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: &ApiRequest,
        session: &SessionState,
    ) -> Result<ApiResponse, FetchError> {
        let url = format!("{}{}", self.base_url, request.path());
        let method = match request {
            ApiRequest::Get { .. } => "GET",
            ApiRequest::PostJson { .. } => "POST",
        };

        let mut req = self
            .agent
            .request(method, &url)
            .set("Cookie", &session.cookie_header())
            .set("Referer", &format!("{}/", self.base_url));
        if let Some(token) = session.csrf_token() {
            req = req.set("x-csrftoken", token);
        }

        let result = match request {
            ApiRequest::Get { .. } => req.call(),
            ApiRequest::PostJson { body, .. } => req.send_json(body.clone()),
        };

        let response = match result {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(t)) => {
                return Err(FetchError::Transport {
                    url,
                    message: t.to_string(),
                })
            }
        };

        let status = response.status();
        let retry_after = response
            .header("Retry-After")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.into_string().map_err(|e| FetchError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;
        tracing::trace!(%url, status, bytes = body.len(), "response");
        Ok(ApiResponse {
            status,
            retry_after,
            body,
        })
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
