use thiserror::Error;

/// Maximum characters to include from an error body in context messages.
pub(crate) const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines errors that can occur when interacting with the API.
///
/// # Example: Handling API Errors
///
/// ```ignore
/// match client.with_model("dialogue").with_text("hi").generate().await {
///     Err(Error::Api { status_code: 401, .. }) => {
///         tracing::error!("credentials rejected");
///     }
///     Err(Error::RetryExhausted { attempts, last_status }) => {
///         tracing::warn!("gave up after {attempts} attempts (last status {last_status})");
///     }
///     // ...
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// Permanent API failure with structured context.
    ///
    /// Carries the HTTP status code and a truncated preview of the response
    /// body. Only statuses outside the transient set (429, 5xx) surface this
    /// variant directly; transient statuses become [`Error::RetryExhausted`]
    /// once the attempt budget is consumed.
    #[error("API error (HTTP {status_code}): {message}")]
    Api {
        /// HTTP status code (e.g., 400, 401, 404)
        status_code: u16,
        /// Truncated response body text
        message: String,
    },
    /// The attempt budget was consumed without a successful response.
    #[error("retries exhausted after {attempts} attempts (last status {last_status})")]
    RetryExhausted {
        /// Total attempts made, including the initial one
        attempts: u32,
        /// Status code of the final transient failure
        last_status: u16,
    },
    /// A bearer token could not be obtained.
    ///
    /// The dispatcher fails closed: no request is sent without a valid
    /// credential attached.
    #[error("credential error: {0}")]
    Credential(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Failed to build the HTTP client, typically TLS backend initialization.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl Error {
    /// Returns `true` if this error is likely transient and the call may
    /// succeed if issued again.
    ///
    /// The dispatcher already retries transient statuses internally; this
    /// helper classifies the errors that escape it, for callers layering
    /// their own retry or queueing logic on top:
    /// - **Transport errors**: connection resets, DNS failures, TLS errors
    /// - **Exhausted retries**: the server was rate limiting or erroring,
    ///   which a later call may outlive
    ///
    /// Validation, credential, and permanent API errors return `false`.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RetryExhausted { .. } => true,
            Error::Api { status_code, .. } => *status_code == 429 || *status_code >= 500,
            Error::Json(_)
            | Error::Credential(_)
            | Error::InvalidInput(_)
            | Error::ClientBuild(_) => false,
        }
    }
}

/// Truncates a string to `max_len` bytes, adding "..." if truncated.
///
/// Slices only at character boundaries so multi-byte UTF-8 never panics.
pub(crate) fn truncate_for_context(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let truncate_at = s
            .char_indices()
            .take_while(|(i, c)| i + c.len_utf8() <= max_len)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..truncate_at])
    }
}
