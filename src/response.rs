//! Response value types with lenient deserialization and pure accessors.

use crate::content::{Blob, FunctionCall};
use crate::errors::Result;
use serde::Deserialize;

/// A successful generate-content response.
///
/// Deserialized leniently: every level defaults when absent, so accessors
/// are safe on partially-populated payloads and never panic. The value is
/// immutable after construction; [`text`](Self::text) and
/// [`function_call`](Self::function_call) are pure derivations over it.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateContentResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Candidate {
    pub content: CandidateContent,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CandidateContent {
    pub role: Option<String>,
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponsePart {
    pub text: Option<String>,
    pub inline_data: Option<Blob>,
    pub function_call: Option<FunctionCall>,
}

impl GenerateContentResponse {
    /// Builds the typed response from the raw payload the dispatcher
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an error only when a present field has the wrong shape (e.g.
    /// `candidates` is not an array); missing fields default instead.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Concatenation of all text parts of the first candidate, or `""` when
    /// no candidate or no text part exists.
    #[must_use]
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First function-call part of the first candidate, if any.
    #[must_use]
    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.candidates
            .first()?
            .content
            .parts
            .iter()
            .find_map(|part| part.function_call.as_ref())
    }
}

/// A successful count-tokens response.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct CountTokensResponse {
    pub total_tokens: u64,
}

impl CountTokensResponse {
    /// Builds the typed response from the raw payload the dispatcher
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an error only when a present field has the wrong shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
