//! The resilient request dispatcher: one POST per logical call, retried
//! with exponential backoff on transient failures.

use crate::auth::AuthResolver;
use crate::errors::{ERROR_BODY_PREVIEW_LENGTH, Error, Result, truncate_for_context};
use crate::retry::{RetryPolicy, Sleeper};
use std::sync::Arc;

/// Disposition of a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    /// 200: parse the body and return.
    Success,
    /// 429 or 5xx: expected to resolve on retry.
    Transient,
    /// Everything else: abort immediately.
    Permanent,
}

const fn classify_status(status: u16) -> StatusClass {
    match status {
        200 => StatusClass::Success,
        429 | 500..=599 => StatusClass::Transient,
        _ => StatusClass::Permanent,
    }
}

pub(crate) struct Dispatcher {
    http: reqwest::Client,
    auth: AuthResolver,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Dispatcher {
    pub(crate) fn new(
        http: reqwest::Client,
        auth: AuthResolver,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            http,
            auth,
            policy,
            sleeper,
        }
    }

    /// Issues a POST to `url` with `body` serialized as JSON and the
    /// resolved credential attached, returning the parsed response payload.
    ///
    /// Retries are strictly sequential: a transient status (429, 5xx) sleeps
    /// `policy.delay_for(attempt)` and tries again while attempts remain;
    /// any other non-200 status aborts at once.
    ///
    /// # Errors
    ///
    /// - [`Error::Credential`] if no credential could be resolved (the
    ///   request is never sent unauthenticated)
    /// - [`Error::Api`] on a permanent non-200 status
    /// - [`Error::RetryExhausted`] once the attempt budget is consumed
    /// - [`Error::Http`] on transport failure, [`Error::Json`] on an
    ///   unparseable success body
    pub(crate) async fn dispatch(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let credential = self.auth.resolve().await?;
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_status = 0;

        for attempt in 0..max_attempts {
            tracing::debug!(%url, attempt, "dispatching request");
            let request = credential.apply(self.http.post(url)).json(body);
            let response = request.send().await?;
            let status = response.status().as_u16();

            match classify_status(status) {
                StatusClass::Success => {
                    let text = response.text().await?;
                    return Ok(serde_json::from_str(&text)?);
                }
                StatusClass::Transient => {
                    last_status = status;
                    if attempt + 1 < max_attempts {
                        let delay = self.policy.delay_for(attempt);
                        tracing::warn!(
                            status,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "transient API failure, retrying after backoff"
                        );
                        self.sleeper.sleep(delay).await;
                    }
                }
                StatusClass::Permanent => {
                    let body_text = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("failed to read error body: {e}"));
                    tracing::error!(status, body = %body_text, "permanent API failure, aborting");
                    return Err(Error::Api {
                        status_code: status,
                        message: truncate_for_context(&body_text, ERROR_BODY_PREVIEW_LENGTH),
                    });
                }
            }
        }

        Err(Error::RetryExhausted {
            attempts: max_attempts,
            last_status,
        })
    }
}
