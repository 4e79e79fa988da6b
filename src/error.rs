//! Error taxonomy and the aggregator shared by every category parser.
//!
//! Each error carries a [`ErrorKind`] tag, the name of the parameter it
//! belongs to (when there is one) and a human-readable message. How the
//! message reaches the user is left to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::param::Parameter;
use crate::value::Value;

/// Tag identifying what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Occurrence or value count does not satisfy the declared arity.
    InvalidArity,
    /// An option or keyword needs a value and none was supplied.
    MissingArgument,
    /// A required parameter is absent and has no default.
    MissingParameter,
    /// A converted value is outside the permitted set.
    UnpermittedArgument,
    /// A converted value failed validation.
    InvalidArgument,
    /// The converter could not handle the raw value.
    InvalidConversionArgument,
    /// Unknown short or long flag.
    InvalidOption,
    /// Unknown environment assignment.
    InvalidParameter,
    /// A long-option prefix matches more than one registered option.
    AmbiguousOption,
    /// Two parameters claim the same name or flag.
    ParameterConflict,
}

impl ErrorKind {
    /// Stable snake_case tag for machine-readable output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArity => "invalid_arity",
            ErrorKind::MissingArgument => "missing_argument",
            ErrorKind::MissingParameter => "missing_parameter",
            ErrorKind::UnpermittedArgument => "unpermitted_argument",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::InvalidConversionArgument => "invalid_conversion_argument",
            ErrorKind::InvalidOption => "invalid_option",
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::AmbiguousOption => "ambiguous_option",
            ErrorKind::ParameterConflict => "parameter_conflict",
        }
    }
}

/// A single parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ErrorKind,
    /// Name of the offending parameter, if the error can be attributed.
    pub parameter: Option<String>,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            parameter: None,
            message: message.into(),
        }
    }

    /// Bind the error to a parameter by name.
    pub fn with_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameter = Some(name.into());
        self
    }

    pub fn invalid_arity(param: &Parameter, actual: usize) -> Self {
        let arity = param.arity_value();
        let expected = match arity.exact() {
            Some(n) => format!("{} {}", n, times(n)),
            None => format!("at least {} {}", arity.minimum(), times(arity.minimum())),
        };
        Self::new(
            ErrorKind::InvalidArity,
            format!(
                "expected {} {} to appear {} but appeared {} {}",
                param.kind().as_str(),
                param.display_name(),
                expected,
                actual,
                times(actual)
            ),
        )
        .with_parameter(param.name())
    }

    pub fn missing_argument(param: &Parameter, spelling: &str) -> Self {
        Self::new(
            ErrorKind::MissingArgument,
            format!("{} {} requires an argument", param.kind().as_str(), spelling),
        )
        .with_parameter(param.name())
    }

    pub fn missing_parameter(param: &Parameter) -> Self {
        Self::new(
            ErrorKind::MissingParameter,
            format!(
                "need to provide '{}' {}",
                param.display_name(),
                param.kind().as_str()
            ),
        )
        .with_parameter(param.name())
    }

    pub fn unpermitted(param: &Parameter, value: &str, choices: &[Value]) -> Self {
        let choices = choices
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            ErrorKind::UnpermittedArgument,
            format!(
                "unpermitted value `{}` for '{}' {}: choose from {}",
                value,
                param.display_name(),
                param.kind().as_str(),
                choices
            ),
        )
        .with_parameter(param.name())
    }

    pub fn invalid_argument(param: &Parameter, value: &Value) -> Self {
        Self::new(
            ErrorKind::InvalidArgument,
            format!(
                "value of `{}` fails validation for '{}' {}",
                value,
                param.display_name(),
                param.kind().as_str()
            ),
        )
        .with_parameter(param.name())
    }

    pub fn invalid_conversion(param: &Parameter, value: &Value, target: &str) -> Self {
        Self::new(
            ErrorKind::InvalidConversionArgument,
            format!(
                "cannot convert value of `{}` into '{}' type for '{}' {}",
                value,
                target,
                param.display_name(),
                param.kind().as_str()
            ),
        )
        .with_parameter(param.name())
    }

    pub fn invalid_option(token: &str) -> Self {
        Self::new(ErrorKind::InvalidOption, format!("invalid option {}", token))
    }

    pub fn invalid_parameter(variable: &str) -> Self {
        Self::new(
            ErrorKind::InvalidParameter,
            format!("invalid environment variable {}", variable),
        )
    }

    pub fn ambiguous_option(token: &str, candidates: &[&str]) -> Self {
        Self::new(
            ErrorKind::AmbiguousOption,
            format!(
                "option {} is ambiguous, possible matches: {}",
                token,
                candidates.join(", ")
            ),
        )
    }

    pub fn conflict(name: &str, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::ParameterConflict,
            format!("parameter '{}' conflicts: {}", name, reason.into()),
        )
        .with_parameter(name)
    }
}

fn times(n: usize) -> &'static str {
    if n == 1 {
        "time"
    } else {
        "times"
    }
}

/// Ordered collection of every error a parse recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Errors {
    items: Vec<ParseError>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: ParseError) {
        self.items.push(err);
    }

    pub fn extend(&mut self, other: Errors) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&ParseError> {
        self.items.first()
    }

    /// Errors attributed to the named parameter.
    pub fn for_parameter<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ParseError> {
        self.items
            .iter()
            .filter(move |e| e.parameter.as_deref() == Some(name))
    }

    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &ParseError> {
        self.items.iter().filter(move |e| e.kind == kind)
    }

    pub fn contains_kind(&self, kind: ErrorKind) -> bool {
        self.items.iter().any(|e| e.kind == kind)
    }

    pub fn messages(&self) -> Vec<String> {
        self.items.iter().map(|e| e.message.clone()).collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.items
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "kind": e.kind.as_str(),
                        "parameter": e.parameter,
                        "message": e.message,
                    })
                })
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for Errors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// How the aggregator reacts to an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Fail fast: the first error aborts the parse.
    Raise,
    /// Keep going and report every error at the end.
    #[default]
    Collect,
}

/// Collects errors or raises the first one, depending on [`ErrorMode`].
#[derive(Debug)]
pub struct ErrorAggregator {
    mode: ErrorMode,
    errors: Errors,
}

impl ErrorAggregator {
    pub fn new(mode: ErrorMode) -> Self {
        Self {
            mode,
            errors: Errors::new(),
        }
    }

    /// Record an error. In raise mode the error comes straight back as `Err`
    /// so callers can abort with `?`.
    pub fn record(&mut self, err: ParseError) -> Result<(), ParseError> {
        tracing::debug!(
            kind = err.kind.as_str(),
            parameter = err.parameter.as_deref().unwrap_or("-"),
            "{}",
            err.message
        );
        match self.mode {
            ErrorMode::Raise => Err(err),
            ErrorMode::Collect => {
                self.errors.push(err);
                Ok(())
            }
        }
    }

    pub fn record_all(&mut self, errs: impl IntoIterator<Item = ParseError>) -> Result<(), ParseError> {
        for err in errs {
            self.record(err)?;
        }
        Ok(())
    }

    pub fn into_errors(self) -> Errors {
        self.errors
    }
}
