use crate::auth::{AuthConfig, AuthResolver};
use crate::content::{Content, ContentInput, GenerateContentRequest, PartInput, format_content};
use crate::dispatch::Dispatcher;
use crate::endpoint::{DEFAULT_API_HOST, Endpoint, ModelVersion, Task};
use crate::errors::{Error, Result};
use crate::response::{CountTokensResponse, GenerateContentResponse};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The main client for the Generative AI API.
///
/// One client owns one HTTP transport, one credential resolver (with its
/// token cache), and one retry policy; individual requests are built through
/// [`Client::with_model`].
pub struct Client {
    host: String,
    use_tls: bool,
    dispatcher: Dispatcher,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("use_tls", &self.use_tls)
            .finish_non_exhaustive()
    }
}

/// Builder for `Client` instances.
///
/// # Example
///
/// ```no_run
/// use genai_dispatch::{AuthConfig, Client};
/// use std::time::Duration;
///
/// # fn main() -> Result<(), genai_dispatch::Error> {
/// let client = Client::builder(AuthConfig::api_key("api-key"))
///     .timeout(Duration::from_secs(120))
///     .connect_timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    auth: AuthConfig,
    host: Option<String>,
    use_tls: bool,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry_policy: Option<RetryPolicy>,
    sleeper: Option<Arc<dyn Sleeper>>,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    fn new(auth: AuthConfig) -> Self {
        Self {
            auth,
            host: None,
            use_tls: true,
            timeout: None,
            connect_timeout: None,
            retry_policy: None,
            sleeper: None,
            http_client: None,
        }
    }

    /// Overrides the API host (defaults to [`DEFAULT_API_HOST`]).
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Selects the URL scheme; `true` (the default) produces `https`.
    #[must_use]
    pub const fn use_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Sets the total request timeout.
    ///
    /// Maximum time a single attempt may take end to end. Generation
    /// requests can run long; 120-300 seconds is a reasonable range. If not
    /// set, uses reqwest's default (no timeout). Backoff waits between
    /// attempts are not counted against it.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// A shorter timeout here fails fast when the network is unavailable.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Overrides the retry policy (defaults to [`RetryPolicy::default`]).
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Overrides the sleeper used between retries. Tests inject a recording
    /// double here to observe backoff without wall-clock delay.
    #[must_use]
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Supplies a pre-built HTTP transport, ignoring the timeout settings
    /// above. Useful for connection pooling across clients or custom DNS
    /// resolution in tests.
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http_client = Some(http);
        self
    }

    /// Builds the `Client`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientBuild`] if the HTTP transport cannot be
    /// constructed.
    pub fn build(self) -> Result<Client> {
        let http = match self.http_client {
            Some(http) => http,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(connect_timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(connect_timeout);
                }
                builder
                    .build()
                    .map_err(|e| Error::ClientBuild(e.to_string()))?
            }
        };

        let auth = AuthResolver::new(self.auth, http.clone());
        let dispatcher = Dispatcher::new(
            http,
            auth,
            self.retry_policy.unwrap_or_default(),
            self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper)),
        );

        Ok(Client {
            host: self.host.unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
            use_tls: self.use_tls,
            dispatcher,
        })
    }
}

impl Client {
    /// Creates a new builder for `Client` instances.
    #[must_use]
    pub fn builder(auth: AuthConfig) -> ClientBuilder {
        ClientBuilder::new(auth)
    }

    /// Creates a client authenticating with an API key and default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::new();
        let auth = AuthResolver::new(AuthConfig::api_key(api_key), http.clone());
        Self {
            host: DEFAULT_API_HOST.to_string(),
            use_tls: true,
            dispatcher: Dispatcher::new(
                http,
                auth,
                RetryPolicy::default(),
                Arc::new(TokioSleeper),
            ),
        }
    }

    /// Starts building a request against a specific model.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use genai_dispatch::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), genai_dispatch::Error> {
    /// let client = Client::new("api-key");
    /// let response = client
    ///     .with_model("dialogue")
    ///     .with_text("Hello there")
    ///     .generate()
    ///     .await?;
    /// println!("{}", response.text());
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn with_model<'a>(&'a self, model: &'a str) -> RequestBuilder<'a> {
        RequestBuilder::new(self, model)
    }

    fn url_for(&self, model: &str, task: Task, model_version: Option<ModelVersion>) -> String {
        Endpoint {
            model,
            task,
            use_tls: self.use_tls,
            model_version,
        }
        .url(&self.host)
    }
}

/// Builder for a single request: message content, generation parameters,
/// and the model revision, terminated by [`generate`](Self::generate) or
/// [`count_tokens`](Self::count_tokens).
#[derive(Debug)]
pub struct RequestBuilder<'a> {
    client: &'a Client,
    model: &'a str,
    model_version: Option<ModelVersion>,
    contents: Vec<Content>,
    input: Option<ContentInput>,
    params: serde_json::Map<String, serde_json::Value>,
}

impl<'a> RequestBuilder<'a> {
    fn new(client: &'a Client, model: &'a str) -> Self {
        Self {
            client,
            model,
            model_version: None,
            contents: Vec::new(),
            input: None,
            params: serde_json::Map::new(),
        }
    }

    /// Selects a content-creator model revision. Ignored for models outside
    /// that family.
    #[must_use]
    pub fn with_model_version(mut self, version: ModelVersion) -> Self {
        self.model_version = Some(version);
        self
    }

    /// Sets the prompt to a bare string.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.input = Some(ContentInput::Text(text.into()));
        self
    }

    /// Sets the prompt to a sequence of strings and pre-formed parts.
    #[must_use]
    pub fn with_parts(mut self, parts: Vec<PartInput>) -> Self {
        self.input = Some(ContentInput::Parts(parts));
        self
    }

    /// Appends a pre-formed message envelope, for multi-turn conversations
    /// where earlier turns already carry their roles.
    #[must_use]
    pub fn with_content(mut self, content: Content) -> Self {
        self.contents.push(content);
        self
    }

    /// Adds a generation parameter passed through verbatim in the body.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    fn assemble(
        contents: Vec<Content>,
        input: Option<ContentInput>,
        params: serde_json::Map<String, serde_json::Value>,
    ) -> Result<GenerateContentRequest> {
        let mut contents = contents;
        if let Some(input) = input {
            contents.push(format_content(input)?);
        }
        if contents.is_empty() {
            return Err(Error::InvalidInput(
                "request requires at least one content message".to_string(),
            ));
        }
        Ok(GenerateContentRequest { contents, params })
    }

    /// Generates content from the configured request.
    ///
    /// # Errors
    ///
    /// Surfaces validation errors immediately; otherwise propagates the
    /// dispatcher's result (see [`crate::Error`]).
    pub async fn generate(self) -> Result<GenerateContentResponse> {
        let Self {
            client,
            model,
            model_version,
            contents,
            input,
            params,
        } = self;
        let request = Self::assemble(contents, input, params)?;
        let url = client.url_for(model, Task::GenerateContent, model_version);
        let body = serde_json::to_value(&request)?;
        let value = client.dispatcher.dispatch(&url, &body).await?;
        GenerateContentResponse::from_value(value)
    }

    /// Counts the tokens the configured request would consume. The model
    /// identifier is merged into the request body alongside the caller's
    /// parameters.
    ///
    /// # Errors
    ///
    /// Surfaces validation errors immediately; otherwise propagates the
    /// dispatcher's result (see [`crate::Error`]).
    pub async fn count_tokens(self) -> Result<CountTokensResponse> {
        let Self {
            client,
            model,
            model_version,
            contents,
            input,
            params,
        } = self;
        let request = Self::assemble(contents, input, params)?;
        let url = client.url_for(model, Task::CountTokens, model_version);
        let mut body = serde_json::to_value(&request)?;
        if let serde_json::Value::Object(map) = &mut body {
            map.insert(
                "model".to_string(),
                serde_json::Value::String(model.to_string()),
            );
        }
        let value = client.dispatcher.dispatch(&url, &body).await?;
        CountTokensResponse::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder_default() {
        let client = Client::builder(AuthConfig::api_key("test_key"))
            .build()
            .expect("build failed");
        assert_eq!(client.host, DEFAULT_API_HOST);
        assert!(client.use_tls);
    }

    #[test]
    fn test_client_builder_overrides() {
        let client = Client::builder(AuthConfig::api_key("test_key"))
            .host("example.test")
            .use_tls(false)
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("build failed");
        assert_eq!(client.host, "example.test");
        assert!(!client.use_tls);
    }

    #[test]
    fn test_url_for_threads_descriptor_through() {
        let client = Client::builder(AuthConfig::api_key("test_key"))
            .host("example.test")
            .build()
            .unwrap();
        assert_eq!(
            client.url_for("dialogue", Task::GenerateContent, None),
            "https://dialogue.example.test/generate_content"
        );
        assert_eq!(
            client.url_for("content-creator", Task::CountTokens, Some(ModelVersion::V1)),
            "https://content-creator.example.test/count_tokens?model_version=v1"
        );
    }

    #[test]
    fn test_assemble_requires_content() {
        let err =
            RequestBuilder::assemble(Vec::new(), None, serde_json::Map::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_assemble_appends_formatted_input_after_history() {
        let history = format_content("earlier turn").unwrap();
        let request = RequestBuilder::assemble(
            vec![history],
            Some(ContentInput::Text("latest".to_string())),
            serde_json::Map::new(),
        )
        .expect("assemble failed");
        assert_eq!(request.contents.len(), 2);
        assert_eq!(request.contents[1].parts[0].text.as_deref(), Some("latest"));
    }
}
