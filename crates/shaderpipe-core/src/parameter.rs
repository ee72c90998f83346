//! Parameter schemas and argument binding.
//!
//! Callers hand each step an untyped `name → string` map (that is what a web
//! form or a command line produces). Each tool declares an ordered schema of
//! [`ParameterSpec`]s; [`bind`] turns the raw map into typed
//! [`BoundArguments`], filling in defaults and rejecting values that do not
//! parse as their declared kind.
//!
//! Keys that are not in the schema are ignored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tool::ToolError;

// ─────────────────────────────────────────────────────────────────────────────
// Schema
// ─────────────────────────────────────────────────────────────────────────────

/// Conventional name of the parameter that selects a tool's output language.
pub const OUTPUT_LANGUAGE: &str = "OutputLanguage";

/// How a raw string value is parsed and validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterKind {
    /// Free-form string, taken verbatim.
    String,
    /// `true` / `false`, case-insensitive.
    Bool,
    /// Signed integer, optionally bounded (inclusive).
    Int {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    /// One of a fixed set of strings.
    Enum { allowed: Vec<String> },
    /// Selects which language the tool emits; one of `allowed`.
    OutputLanguage { allowed: Vec<String> },
}

impl ParameterKind {
    fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int { .. } => "int",
            Self::Enum { .. } => "enum",
            Self::OutputLanguage { .. } => "output language",
        }
    }
}

/// A single entry in a tool's parameter schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Argument key, e.g. `"EntryPoint"`.
    pub name: String,
    /// One-line description shown in tool listings.
    #[serde(default)]
    pub description: String,
    pub kind: ParameterKind,
    /// Raw default, parsed with the same rules as caller-supplied values.
    pub default: String,
}

impl ParameterSpec {
    fn new(name: impl Into<String>, kind: ParameterKind, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind,
            default: default.into(),
        }
    }

    /// Free-form string parameter.
    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::String, default)
    }

    /// Boolean flag.
    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, ParameterKind::Bool, default.to_string())
    }

    /// Unbounded integer.
    pub fn integer(name: impl Into<String>, default: i64) -> Self {
        Self::new(
            name,
            ParameterKind::Int {
                min: None,
                max: None,
            },
            default.to_string(),
        )
    }

    /// Integer restricted to `min..=max`.
    pub fn integer_in(name: impl Into<String>, min: i64, max: i64, default: i64) -> Self {
        Self::new(
            name,
            ParameterKind::Int {
                min: Some(min),
                max: Some(max),
            },
            default.to_string(),
        )
    }

    /// One of a fixed list of values.
    pub fn choice<I, S>(name: impl Into<String>, allowed: I, default: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = allowed.into_iter().map(Into::into).collect();
        Self::new(name, ParameterKind::Enum { allowed }, default)
    }

    /// The `OutputLanguage` selector.
    pub fn output_language<I, S>(allowed: I, default: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = allowed.into_iter().map(Into::into).collect();
        Self::new(
            OUTPUT_LANGUAGE,
            ParameterKind::OutputLanguage { allowed },
            default,
        )
        .with_description("Language of the pipeable output")
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Parse a raw value according to this parameter's kind.
    pub fn parse(&self, raw: &str) -> Result<ArgumentValue, ParameterError> {
        let invalid = |reason: String| ParameterError {
            name: self.name.clone(),
            raw_value: raw.to_string(),
            reason,
        };

        match &self.kind {
            ParameterKind::String => Ok(ArgumentValue::String(raw.to_string())),
            ParameterKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(ArgumentValue::Bool(true)),
                "false" => Ok(ArgumentValue::Bool(false)),
                _ => Err(invalid("expected 'true' or 'false'".into())),
            },
            ParameterKind::Int { min, max } => {
                let value: i64 = raw
                    .trim()
                    .parse()
                    .map_err(|e| invalid(format!("not an integer: {e}")))?;
                if let Some(min) = min
                    && value < *min
                {
                    return Err(invalid(format!("must be at least {min}")));
                }
                if let Some(max) = max
                    && value > *max
                {
                    return Err(invalid(format!("must be at most {max}")));
                }
                Ok(ArgumentValue::Int(value))
            }
            ParameterKind::Enum { allowed } | ParameterKind::OutputLanguage { allowed } => {
                if allowed.iter().any(|a| a == raw) {
                    Ok(ArgumentValue::String(raw.to_string()))
                } else {
                    Err(invalid(format!(
                        "{} must be one of: {}",
                        self.kind.type_name(),
                        allowed.join(", ")
                    )))
                }
            }
        }
    }

    /// Allowed values of an `OutputLanguage` parameter, `None` for other kinds.
    pub fn output_languages(&self) -> Option<&[String]> {
        match &self.kind {
            ParameterKind::OutputLanguage { allowed } => Some(allowed),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Binding
// ─────────────────────────────────────────────────────────────────────────────

/// A raw argument that failed to parse or validate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter '{name}' has invalid value '{raw_value}': {reason}")]
pub struct ParameterError {
    pub name: String,
    pub raw_value: String,
    pub reason: String,
}

/// A typed argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    String(String),
    Bool(bool),
    Int(i64),
}

impl std::fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
        }
    }
}

/// Validated arguments, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoundArguments {
    values: Vec<(String, ArgumentValue)>,
}

impl BoundArguments {
    /// Look up an argument by name.
    pub fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// A string-valued argument (String, Enum and OutputLanguage kinds).
    pub fn string(&self, name: &str) -> Result<&str, ToolError> {
        match self.get(name) {
            Some(ArgumentValue::String(s)) => Ok(s),
            Some(_) => Err(ToolError::ArgumentType {
                name: name.to_string(),
                expected: "string",
            }),
            None => Err(ToolError::MissingArgument(name.to_string())),
        }
    }

    /// A boolean argument.
    pub fn boolean(&self, name: &str) -> Result<bool, ToolError> {
        match self.get(name) {
            Some(ArgumentValue::Bool(b)) => Ok(*b),
            Some(_) => Err(ToolError::ArgumentType {
                name: name.to_string(),
                expected: "bool",
            }),
            None => Err(ToolError::MissingArgument(name.to_string())),
        }
    }

    /// An integer argument.
    pub fn integer(&self, name: &str) -> Result<i64, ToolError> {
        match self.get(name) {
            Some(ArgumentValue::Int(i)) => Ok(*i),
            Some(_) => Err(ToolError::ArgumentType {
                name: name.to_string(),
                expected: "int",
            }),
            None => Err(ToolError::MissingArgument(name.to_string())),
        }
    }

    /// Iterate `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgumentValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Bind raw arguments against a schema.
///
/// Every parameter contributes exactly one value: the caller's if present,
/// otherwise its default. The first value that fails to parse aborts binding.
pub fn bind(
    schema: &[ParameterSpec],
    raw: &HashMap<String, String>,
) -> Result<BoundArguments, ParameterError> {
    let values = schema
        .iter()
        .map(|spec| {
            let raw_value = raw.get(&spec.name).unwrap_or(&spec.default);
            spec.parse(raw_value).map(|v| (spec.name.clone(), v))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BoundArguments { values })
}
