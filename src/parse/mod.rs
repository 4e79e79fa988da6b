//! Command-line parsing for one invocation.
//!
//! The four category parsers run in a fixed order, each handing the tokens
//! it did not claim to the next:
//!
//! ```text
//! argv → Options → Keywords → Arguments → Environment (+ env map) → ParseOutcome
//! ```
//!
//! Tokens after the end-of-options marker skip all four and land at the end
//! of `remaining`.

mod arguments;
mod checks;
mod environment;
mod keywords;
mod options;
mod outcome;
mod state;
mod token;

use std::collections::HashMap;

pub use arguments::ArgumentsParser;
pub use environment::EnvironmentParser;
pub use keywords::KeywordsParser;
pub use options::OptionsParser;
pub use outcome::ParseOutcome;
pub use state::Stage;
pub use token::{classify, is_argument, is_env, is_keyword, is_option, TokenShape};

use crate::config::ParseSettings;
use crate::convert::ConversionRegistry;
use crate::error::{Errors, ParseError};
use crate::param::ParameterSet;

/// Parameters, conversions and settings for one command. Reusable across
/// any number of parses.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    params: ParameterSet,
    registry: ConversionRegistry,
    settings: ParseSettings,
}

impl Parser {
    pub fn new(params: ParameterSet) -> Self {
        Self {
            params,
            registry: ConversionRegistry::with_builtins(),
            settings: ParseSettings::default(),
        }
    }

    pub fn with_registry(mut self, registry: ConversionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_settings(mut self, settings: ParseSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    pub fn settings(&self) -> &ParseSettings {
        &self.settings
    }

    /// Parse `argv` against the registered parameters, reading environment
    /// parameters from `env`.
    ///
    /// In collect mode this always returns `Ok`; inspect
    /// [`ParseOutcome::errors`]. In raise mode the first error aborts the
    /// parse and comes back as `Err`.
    pub fn parse<I, S>(&self, argv: I, env: &HashMap<String, String>) -> Result<ParseOutcome, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (head, tail) = self.split_end_of_options(argv.into_iter().map(Into::into).collect());
        tracing::debug!(tokens = head.len(), trailing = tail.len(), "Parsing command line");

        let params = &self.params;
        let registry = &self.registry;
        let settings = &self.settings;

        let options = OptionsParser::new(params, registry, settings).parse(head)?;
        let keywords = KeywordsParser::new(params, registry, settings).parse(options.remaining)?;
        let arguments = ArgumentsParser::new(params, registry, settings).parse(keywords.remaining)?;
        let environment =
            EnvironmentParser::new(params, registry, settings).parse(arguments.remaining, env)?;

        let mut values = options.parsed;
        let mut errors = Errors::new();
        errors.extend(options.errors);
        for stage in [
            (keywords.parsed, keywords.errors),
            (arguments.parsed, arguments.errors),
            (environment.parsed, environment.errors),
        ] {
            values.extend(stage.0);
            errors.extend(stage.1);
        }

        let mut remaining = environment.remaining;
        remaining.extend(tail);

        tracing::debug!(
            values = values.len(),
            remaining = remaining.len(),
            errors = errors.len(),
            "Parse finished"
        );
        Ok(ParseOutcome::new(values, remaining, errors))
    }

    /// Split at the first standalone marker; the marker itself is dropped.
    fn split_end_of_options(&self, mut argv: Vec<String>) -> (Vec<String>, Vec<String>) {
        let marker = self.settings.end_of_options.as_str();
        if marker.is_empty() {
            return (argv, Vec::new());
        }
        match argv.iter().position(|t| t == marker) {
            Some(i) => {
                let tail = argv.split_off(i + 1);
                argv.pop();
                (argv, tail)
            }
            None => (argv, Vec::new()),
        }
    }
}
