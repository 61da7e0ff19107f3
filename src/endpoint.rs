//! Endpoint descriptors and URL construction.
//!
//! The API addresses models as subdomains: `https://{model}.{host}/{task}`.
//! Content-creator models additionally accept a `model_version` query
//! parameter selecting a revision of the model.

/// Default API host. Override per client with [`crate::ClientBuilder::host`].
pub const DEFAULT_API_HOST: &str = "generativelanguage.googleapis.com";

/// The API operation being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Count the tokens a request would consume.
    CountTokens,
    /// Generate model content from a request.
    GenerateContent,
}

impl Task {
    const fn as_str(self) -> &'static str {
        match self {
            Self::CountTokens => "count_tokens",
            Self::GenerateContent => "generate_content",
        }
    }
}

/// Revision of a content-creator model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVersion {
    V1,
    V2,
}

impl ModelVersion {
    const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

/// Model family, derived from the model identifier.
///
/// Only the content-creator family supports the `model_version` query
/// parameter; it is silently omitted for every other family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Dialogue,
    ContentCreator,
}

const CONTENT_CREATOR_PREFIX: &str = "content-creator";

impl ModelFamily {
    /// Classifies a model identifier.
    #[must_use]
    pub fn of(model: &str) -> Self {
        if model.starts_with(CONTENT_CREATOR_PREFIX) {
            Self::ContentCreator
        } else {
            Self::Dialogue
        }
    }
}

/// Describes one target endpoint. Immutable once constructed.
///
/// URL construction is pure and deterministic given the descriptor; no
/// validation happens at this layer, malformed model strings pass through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub model: &'a str,
    pub task: Task,
    pub use_tls: bool,
    pub model_version: Option<ModelVersion>,
}

impl Endpoint<'_> {
    /// Produces the URL string for this endpoint against `host`.
    #[must_use]
    pub fn url(&self, host: &str) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        let query = match (ModelFamily::of(self.model), self.model_version) {
            (ModelFamily::ContentCreator, Some(version)) => {
                format!("?model_version={}", version.as_str())
            }
            _ => String::new(),
        };
        format!(
            "{scheme}://{model}.{host}/{task}{query}",
            model = self.model,
            task = self.task.as_str()
        )
    }
}
