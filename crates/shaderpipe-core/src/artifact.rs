//! Shader artifacts flowing between pipeline steps.
//!
//! A [`ShaderCode`] is a language-tagged payload that is either text (HLSL
//! source, GLSL emitted by a cross compiler) or binary (DXBC, DXIL, SPIR-V
//! modules). Binary payloads serialize as base64 so results can be emitted as
//! JSON.

use serde::{Deserialize, Serialize};

/// Representation of an artifact's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeType {
    Text,
    Binary,
}

/// Text or binary content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code_type", content = "value", rename_all = "snake_case")]
pub enum Payload {
    Text(String),
    Binary(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl Payload {
    /// Which representation this payload uses.
    pub fn code_type(&self) -> CodeType {
        match self {
            Self::Text(_) => CodeType::Text,
            Self::Binary(_) => CodeType::Binary,
        }
    }

    /// The text content, if this is a text payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    /// Raw bytes of the payload (UTF-8 for text).
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A language-tagged artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderCode {
    /// Opaque language tag, e.g. `"HLSL"` or `"SPIR-V"`.
    pub language: String,
    /// The content.
    pub payload: Payload,
}

impl ShaderCode {
    /// Create a text artifact.
    pub fn text(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            payload: Payload::Text(text.into()),
        }
    }

    /// Create a binary artifact.
    pub fn binary(language: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            language: language.into(),
            payload: Payload::Binary(bytes.into()),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn code_type(&self) -> CodeType {
        self.payload.code_type()
    }

    pub fn as_text(&self) -> Option<&str> {
        self.payload.as_text()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.payload.as_bytes()
    }
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
