//! JSON and GraphQL calls on top of a [`Transport`] with retries.

use lcmirror_core::{Config, SessionState};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::FetchError;
use crate::retry::{send_with_retry, RetryPolicy};
use crate::transport::{ApiRequest, HttpTransport, Transport};

pub const GRAPHQL_PATH: &str = "/graphql/";

pub struct ApiClient {
    transport: Box<dyn Transport>,
    policy: RetryPolicy,
    page_size: usize,
}

#[derive(Deserialize)]
struct GraphQlEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

impl ApiClient {
    pub fn new(transport: Box<dyn Transport>, policy: RetryPolicy, page_size: usize) -> Self {
        Self {
            transport,
            policy,
            page_size: page_size.max(1),
        }
    }

    /// Real HTTP client for the configured service.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(HttpTransport::new(&config.base_url)),
            RetryPolicy::from_settings(&config.retry),
            config.page_size,
        )
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn get_json<T: DeserializeOwned>(
        &self,
        session: &SessionState,
        path: &str,
    ) -> Result<T, FetchError> {
        let request = ApiRequest::Get {
            path: path.to_string(),
        };
        let response = send_with_retry(self.transport.as_ref(), &self.policy, &request, session)?;
        serde_json::from_str(&response.body).map_err(|e| FetchError::Decode {
            url: self.url(path),
            message: e.to_string(),
        })
    }

    /// Run a GraphQL operation and return its `data` payload.
    pub fn graphql<T: DeserializeOwned>(
        &self,
        session: &SessionState,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> Result<T, FetchError> {
        let request = ApiRequest::PostJson {
            path: GRAPHQL_PATH.to_string(),
            body: json!({
                "operationName": operation,
                "query": query,
                "variables": variables,
            }),
        };
        let response = send_with_retry(self.transport.as_ref(), &self.policy, &request, session)?;
        let envelope: GraphQlEnvelope<T> =
            serde_json::from_str(&response.body).map_err(|e| FetchError::Decode {
                url: self.url(GRAPHQL_PATH),
                message: e.to_string(),
            })?;
        match envelope.data {
            Some(data) => Ok(data),
            None => Err(FetchError::GraphQl {
                operation: operation.to_string(),
                message: envelope
                    .errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.transport.base_url(), path)
    }
}
