//! Request content shapes and the formatting rules that turn caller input
//! into role-tagged message envelopes.

use crate::errors::{Error, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Conversation role attached to a message envelope.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    Function,
}

/// An atomic unit of multimodal content.
///
/// Exactly one of the fields is expected to be set; the constructors below
/// maintain that shape.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

impl Part {
    /// A plain text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// An inline binary part; `bytes` are base64-encoded on construction.
    #[must_use]
    pub fn inline_data(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            inline_data: Some(Blob {
                data,
                mime_type: mime_type.into(),
            }),
            ..Self::default()
        }
    }

    /// A function call issued by the model (echoed back in multi-turn flows).
    #[must_use]
    pub fn function_call(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            function_call: Some(FunctionCall {
                name: name.into(),
                args,
            }),
            ..Self::default()
        }
    }

    /// The caller's response to a function call.
    #[must_use]
    pub fn function_response(name: impl Into<String>, response: serde_json::Value) -> Self {
        Self {
            function_response: Some(FunctionResponse {
                name: name.into(),
                response,
            }),
            ..Self::default()
        }
    }

    fn is_function_response(&self) -> bool {
        self.function_response.is_some()
    }
}

/// Base64-encoded binary data with its MIME type.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub data: String,
    pub mime_type: String,
}

/// A function call made by the model.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: serde_json::Value,
}

/// The response to a function call.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct FunctionResponse {
    pub name: String,
    pub response: serde_json::Value,
}

/// A role-tagged ordered collection of parts: one turn in a conversation.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

/// One element of a mixed prompt sequence.
#[derive(Debug, Clone)]
pub enum PartInput {
    Text(String),
    Part(Part),
}

impl From<&str> for PartInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for PartInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Part> for PartInput {
    fn from(part: Part) -> Self {
        Self::Part(part)
    }
}

/// Caller-facing prompt input: a bare string or a sequence of strings and
/// already-formed parts.
#[derive(Debug, Clone)]
pub enum ContentInput {
    Text(String),
    Parts(Vec<PartInput>),
}

impl From<&str> for ContentInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ContentInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<PartInput>> for ContentInput {
    fn from(parts: Vec<PartInput>) -> Self {
        Self::Parts(parts)
    }
}

impl From<Vec<Part>> for ContentInput {
    fn from(parts: Vec<Part>) -> Self {
        Self::Parts(parts.into_iter().map(PartInput::Part).collect())
    }
}

/// Formats caller input into a message envelope.
///
/// Strings become text parts; pre-formed parts pass through unchanged. The
/// resulting part list must be homogeneous: either no part is a function
/// response (role becomes `user`) or every part is one (role becomes
/// `function`).
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for an empty part list or a list mixing
/// function responses with other part types.
pub fn format_content(input: impl Into<ContentInput>) -> Result<Content> {
    let parts: Vec<Part> = match input.into() {
        ContentInput::Text(text) => vec![Part::text(text)],
        ContentInput::Parts(inputs) => inputs
            .into_iter()
            .map(|input| match input {
                PartInput::Text(text) => Part::text(text),
                PartInput::Part(part) => part,
            })
            .collect(),
    };

    if parts.is_empty() {
        return Err(Error::InvalidInput(
            "content must contain at least one part".to_string(),
        ));
    }

    let function_responses = parts.iter().filter(|p| p.is_function_response()).count();
    let role = if function_responses == 0 {
        Role::User
    } else if function_responses == parts.len() {
        Role::Function
    } else {
        return Err(Error::InvalidInput(
            "cannot mix function responses with other part types in one message".to_string(),
        ));
    };

    Ok(Content { role, parts })
}

/// Serialized body of a generate-content request: the formatted message
/// envelopes plus caller-supplied generation parameters flattened alongside.
#[derive(Clone, Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}
