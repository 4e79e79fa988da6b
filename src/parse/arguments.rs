//! Arguments parser: positional values, resolved in declaration order.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::config::ParseSettings;
use crate::convert::ConversionRegistry;
use crate::error::{ErrorAggregator, ParseError};
use crate::param::{ParamKind, Parameter, ParameterSet};
use crate::parse::checks::RequiredCheck;
use crate::parse::state::{collapse, Context, Stage};
use crate::parse::token::is_argument;
use crate::pipeline::Pipeline;
use crate::value::Value;

pub struct ArgumentsParser<'a> {
    pipeline: Pipeline<'a>,
    arguments: Vec<&'a Parameter>,
    argv: VecDeque<String>,
    remaining: Vec<String>,
    parsed: IndexMap<String, Value>,
    errors: ErrorAggregator,
    required: RequiredCheck<'a>,
}

impl<'a> ArgumentsParser<'a> {
    pub fn new(
        params: &'a ParameterSet,
        registry: &'a ConversionRegistry,
        settings: &'a ParseSettings,
    ) -> Self {
        let ctx = Context::new(registry, settings);
        Self {
            pipeline: ctx.pipeline(),
            arguments: params.of_kind(ParamKind::Argument).collect(),
            argv: VecDeque::new(),
            remaining: Vec::new(),
            parsed: IndexMap::new(),
            errors: ctx.aggregator(),
            required: RequiredCheck::new(),
        }
    }

    pub fn parse(mut self, argv: Vec<String>) -> Result<Stage, ParseError> {
        self.argv = argv.into();

        let arguments = std::mem::take(&mut self.arguments);
        for param in arguments {
            self.required.add(param);
            self.process(param)?;
        }

        self.remaining.extend(self.argv.drain(..));
        self.required.finish(&mut self.errors)?;

        let stage = Stage {
            parsed: self.parsed,
            remaining: self.remaining,
            errors: self.errors.into_errors(),
        };
        tracing::debug!(
            parsed = stage.parsed.len(),
            remaining = stage.remaining.len(),
            errors = stage.errors.len(),
            "Arguments parsed"
        );
        Ok(stage)
    }

    fn process(&mut self, param: &'a Parameter) -> Result<(), ParseError> {
        let arity = param.arity_value();
        let minimum = arity.exact().unwrap_or_else(|| arity.minimum());

        let mut values = self.pull(minimum);
        if arity.exact().is_none() {
            values.extend(self.pull(usize::MAX));
        }
        tracing::trace!(argument = param.name(), captured = values.len(), "Argument values");

        if values.is_empty() {
            if let Some(default) = param.default_value() {
                self.parsed.insert(param.name().to_string(), default);
            }
            return Ok(());
        }
        self.required.observe(param.name());

        if values.len() < minimum {
            // A default with enough values stands in for a short capture.
            match param.default_value() {
                Some(default) if default.count() >= minimum => {
                    self.parsed.insert(param.name().to_string(), default);
                }
                _ => {
                    self.errors
                        .record(ParseError::invalid_arity(param, values.len()))?;
                }
            }
            return Ok(());
        }

        let Some(raw) = collapse(values) else {
            return Ok(());
        };
        match self.pipeline.process(param, raw) {
            Ok(value) => {
                self.parsed.insert(param.name().to_string(), value);
            }
            Err(errs) => self.errors.record_all(errs)?,
        }
        Ok(())
    }

    /// Pull up to `n` argument-shaped tokens; anything else met on the way
    /// is deferred to `remaining`.
    fn pull(&mut self, n: usize) -> Vec<String> {
        let mut values = Vec::new();
        while values.len() < n {
            let Some(token) = self.argv.pop_front() else {
                break;
            };
            if is_argument(&token) {
                values.push(token);
            } else {
                self.remaining.push(token);
            }
        }
        values
    }
}
