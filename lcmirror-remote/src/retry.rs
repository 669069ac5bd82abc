//! Bounded exponential backoff.

use std::time::Duration;

use lcmirror_core::config::RetrySettings;
use lcmirror_core::SessionState;

use crate::error::FetchError;
use crate::transport::{ApiRequest, ApiResponse, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_retry_after: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            max_retry_after: Duration::from_millis(settings.max_retry_after_ms),
        }
    }

    /// Retries without sleeping; for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_retry_after: Duration::ZERO,
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    ///
    /// `base * 2^(attempt-1)` capped at `max_delay`. A server `Retry-After`
    /// replaces it, capped at the larger of `max_retry_after` and `max_delay`.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) => hint.min(self.max_retry_after.max(self.max_delay)),
            None => {
                let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
                self.base_delay.saturating_mul(factor).min(self.max_delay)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

/// Send `request` until it succeeds, fails permanently or the policy runs out.
///
/// 2xx is returned; 401/403 become [`FetchError::Unauthorized`]; 429, 5xx
/// and transport failures are retried; any other status fails at once.
pub fn send_with_retry(
    transport: &dyn Transport,
    policy: &RetryPolicy,
    request: &ApiRequest,
    session: &SessionState,
) -> Result<ApiResponse, FetchError> {
    let url = format!("{}{}", transport.base_url(), request.path());
    let mut attempt = 0;
    loop {
        attempt += 1;
        let (err, retry_after) = match transport.send(request, session) {
            Ok(resp) if resp.is_success() => return Ok(resp),
            Ok(resp) if resp.status == 401 || resp.status == 403 => {
                return Err(FetchError::Unauthorized {
                    url,
                    status: resp.status,
                })
            }
            Ok(resp) => (
                FetchError::Status {
                    url: url.clone(),
                    status: resp.status,
                },
                resp.retry_after,
            ),
            Err(e) => (e, None),
        };

        if !err.is_retryable() {
            return Err(err);
        }
        if attempt >= policy.max_attempts {
            return Err(FetchError::RetriesExhausted {
                attempts: attempt,
                last: Box::new(err),
            });
        }

        let delay = policy.delay_for(attempt, retry_after);
        tracing::warn!(
            %url,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "retrying"
        );
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
