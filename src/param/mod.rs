//! Parameter model: descriptors for the four parameter categories.
//!
//! A [`Parameter`] is built once with the chained setters below, registered
//! in a [`ParameterSet`] and then only read by the parsers.
//!
//! ```text
//! Parameter::option("file").short("-f").long("--file PATH").convert("path")
//! Parameter::argument("sources").arity(Arity::ONE_OR_MORE)
//! Parameter::keyword("level").convert("int").permit([1, 2, 3])
//! Parameter::env("home").variable("HOME")
//! ```

mod arity;
mod set;
mod spelling;

use std::fmt;
use std::sync::Arc;

use regex::Regex;

pub use arity::Arity;
pub use set::ParameterSet;
pub use spelling::{FlagSpelling, ValueMode};

use crate::convert::Conversion;
use crate::value::Value;

/// Which category a parameter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Argument,
    Keyword,
    Option,
    Env,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Argument => "argument",
            ParamKind::Keyword => "keyword",
            ParamKind::Option => "option",
            ParamKind::Env => "environment",
        }
    }

    /// Required-ness when not set explicitly.
    fn default_required(&self, arity: Arity) -> bool {
        match self {
            ParamKind::Argument => !arity.allows_zero(),
            ParamKind::Keyword | ParamKind::Option | ParamKind::Env => false,
        }
    }
}

/// Predicate applied to each converted value.
#[derive(Clone)]
pub enum Validator {
    /// Matched against the value's string form.
    Pattern(Regex),
    Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

impl Validator {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Validator::Pattern(re) => re.is_match(&value.to_string()),
            Validator::Predicate(f) => f(value),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Validator::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Value used when a parameter never occurs.
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    /// Evaluated once per parse.
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Value(v) => v.clone(),
            DefaultValue::Producer(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DefaultValue::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// A parameter descriptor.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    kind: ParamKind,
    arity: Arity,
    convert: Option<Conversion>,
    validate: Option<Validator>,
    permit: Option<Vec<Value>>,
    default: Option<DefaultValue>,
    required: Option<bool>,
    short: Option<FlagSpelling>,
    long: Option<FlagSpelling>,
    variable: Option<String>,
}

impl Parameter {
    fn new(kind: ParamKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            arity: Arity::ONE,
            convert: None,
            validate: None,
            permit: None,
            default: None,
            required: None,
            short: None,
            long: None,
            variable: None,
        }
    }

    pub fn argument(name: impl Into<String>) -> Self {
        Self::new(ParamKind::Argument, name)
    }

    pub fn keyword(name: impl Into<String>) -> Self {
        Self::new(ParamKind::Keyword, name)
    }

    pub fn option(name: impl Into<String>) -> Self {
        Self::new(ParamKind::Option, name)
    }

    pub fn env(name: impl Into<String>) -> Self {
        Self::new(ParamKind::Env, name)
    }

    // === Setters ===

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    /// Convert with a registry entry such as `"int"` or `"float_list"`.
    pub fn convert(mut self, name: impl Into<String>) -> Self {
        self.convert = Some(Conversion::Named(name.into()));
        self
    }

    pub fn convert_with(mut self, conversion: Conversion) -> Self {
        self.convert = Some(conversion);
        self
    }

    pub fn validate(mut self, pattern: Regex) -> Self {
        self.validate = Some(Validator::Pattern(pattern));
        self
    }

    pub fn validate_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Validator::Predicate(Arc::new(f)));
        self
    }

    pub fn permit<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.permit = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Producer(Arc::new(f)));
        self
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = Some(false);
        self
    }

    pub fn short(mut self, spelling: &str) -> Self {
        self.short = Some(FlagSpelling::short(spelling));
        self
    }

    pub fn long(mut self, spelling: &str) -> Self {
        self.long = Some(FlagSpelling::long(spelling));
        self
    }

    pub fn variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    // === Accessors ===

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn arity_value(&self) -> Arity {
        self.arity
    }

    pub fn conversion(&self) -> Option<&Conversion> {
        self.convert.as_ref()
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validate.as_ref()
    }

    pub fn permitted(&self) -> Option<&[Value]> {
        self.permit.as_deref()
    }

    pub fn is_multiple(&self) -> bool {
        self.arity.is_multiple()
    }

    pub fn is_required(&self) -> bool {
        self.required
            .unwrap_or_else(|| self.kind.default_required(self.arity))
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Evaluate the default, calling the producer if there is one.
    pub fn default_value(&self) -> Option<Value> {
        self.default.as_ref().map(DefaultValue::resolve)
    }

    pub fn short_flag(&self) -> Option<&FlagSpelling> {
        self.short.as_ref()
    }

    pub fn long_flag(&self) -> Option<&FlagSpelling> {
        self.long.as_ref()
    }

    /// Combined value mode of the short and long spellings.
    pub fn value_mode(&self) -> ValueMode {
        let modes = [&self.short, &self.long];
        let modes = modes.iter().filter_map(|s| s.as_ref().map(|s| s.mode));
        modes.fold(ValueMode::Flag, |acc, mode| match (acc, mode) {
            (ValueMode::Required, _) | (_, ValueMode::Required) => ValueMode::Required,
            (ValueMode::Optional, _) | (_, ValueMode::Optional) => ValueMode::Optional,
            _ => ValueMode::Flag,
        })
    }

    /// Token spelling matched by the keywords parser (`dry_run` → `dry-run`).
    pub fn keyword_name(&self) -> String {
        self.name.replace('_', "-")
    }

    /// Variable looked up by the environment parser.
    pub fn variable_name(&self) -> String {
        match &self.variable {
            Some(v) => v.clone(),
            None => self.name.to_uppercase().replace('-', "_"),
        }
    }

    /// Name shown in error messages.
    pub fn display_name(&self) -> String {
        match self.kind {
            ParamKind::Argument => self.name.to_uppercase(),
            ParamKind::Keyword => self.keyword_name(),
            ParamKind::Option => self
                .long
                .as_ref()
                .or(self.short.as_ref())
                .map(|s| s.name.clone())
                .unwrap_or_else(|| format!("--{}", self.keyword_name())),
            ParamKind::Env => self.variable_name(),
        }
    }

    /// Options with no spelling answer to `--<name>`.
    pub(crate) fn with_default_spelling(mut self) -> Self {
        if self.kind == ParamKind::Option && self.short.is_none() && self.long.is_none() {
            self.long = Some(FlagSpelling::long(&format!("--{}", self.keyword_name())));
        }
        self
    }
}
