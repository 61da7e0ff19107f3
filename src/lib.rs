// Declare the client, auth, content, and dispatch support modules.
pub mod auth;
pub mod client;
pub mod content;
pub mod endpoint;
pub mod errors;
pub mod response;
pub mod retry;

mod dispatch;

// Import and selectively re-export the public surface.

pub use client::Client;
pub use client::ClientBuilder;
pub use client::RequestBuilder;

pub use auth::API_KEY_HEADER;
pub use auth::AuthConfig;
pub use auth::ServiceAccountCredentials;
pub use auth::ServiceAccountTokenProvider;
pub use auth::StaticTokenProvider;
pub use auth::TokenProvider;

pub use content::Blob;
pub use content::Content;
pub use content::ContentInput;
pub use content::FunctionCall;
pub use content::FunctionResponse;
pub use content::GenerateContentRequest;
pub use content::Part;
pub use content::PartInput;
pub use content::Role;
pub use content::format_content;

pub use endpoint::DEFAULT_API_HOST;
pub use endpoint::Endpoint;
pub use endpoint::ModelFamily;
pub use endpoint::ModelVersion;
pub use endpoint::Task;

pub use errors::Error;
pub use errors::Result;

pub use response::Candidate;
pub use response::CandidateContent;
pub use response::CountTokensResponse;
pub use response::GenerateContentResponse;
pub use response::ResponsePart;

pub use retry::RetryPolicy;
pub use retry::Sleeper;
pub use retry::TokioSleeper;
