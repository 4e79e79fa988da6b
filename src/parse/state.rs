//! Transient per-parse state shared by the category parsers.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexMap;

use crate::config::ParseSettings;
use crate::convert::{insert_grouped, ConversionRegistry};
use crate::error::{ErrorAggregator, Errors, ParseError};
use crate::param::Parameter;
use crate::pipeline::Pipeline;
use crate::value::Value;

/// Three-part result of one category parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stage {
    pub parsed: IndexMap<String, Value>,
    pub remaining: Vec<String>,
    pub errors: Errors,
}

/// Read-only inputs every category parser needs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Context<'a> {
    pub registry: &'a ConversionRegistry,
    pub settings: &'a ParseSettings,
}

impl<'a> Context<'a> {
    pub fn new(registry: &'a ConversionRegistry, settings: &'a ParseSettings) -> Self {
        Self { registry, settings }
    }

    pub fn pipeline(&self) -> Pipeline<'a> {
        Pipeline::new(self.registry)
    }

    pub fn aggregator(&self) -> ErrorAggregator {
        ErrorAggregator::new(self.settings.error_mode)
    }

    /// A collection-shaped conversion makes one occurrence greedy.
    pub fn is_multi_argument(&self, param: &Parameter) -> bool {
        param
            .conversion()
            .is_some_and(|c| self.registry.shape_of(c).is_collection())
    }

    /// Pop tokens while `keep` accepts them, splitting each on the value
    /// separator.
    pub fn consume_while(
        &self,
        argv: &mut VecDeque<String>,
        keep: impl Fn(&str) -> bool,
    ) -> Vec<String> {
        let mut values = Vec::new();
        while argv.front().is_some_and(|t| keep(t.as_str())) {
            let Some(token) = argv.pop_front() else {
                break;
            };
            values.extend(self.split_value(token));
        }
        values
    }

    /// `a&b` → `["a", "b"]`; empty pieces are dropped.
    pub fn split_value(&self, token: String) -> Vec<String> {
        let separator = self.settings.value_separator.as_str();
        if separator.is_empty() || !token.contains(separator) {
            return vec![token];
        }
        token
            .split(separator)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// One scalar for a single value, a list otherwise.
pub(crate) fn collapse(mut values: Vec<String>) -> Option<Value> {
    match values.len() {
        0 => None,
        1 => values.pop().map(Value::Str),
        _ => Some(Value::from(values)),
    }
}

/// Parsed values plus occurrence counts for options, keywords and env vars.
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    parsed: IndexMap<String, Value>,
    multiples: HashMap<String, Value>,
    counts: HashMap<String, usize>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-assign a default; the first real occurrence replaces it.
    pub fn seed(&mut self, name: &str, value: Value) {
        self.parsed.insert(name.to_string(), value);
    }

    pub fn count(&mut self, name: &str) {
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn counts(&self) -> &HashMap<String, usize> {
        &self.counts
    }

    /// Scalars overwrite; multiples append to a list or merge into a map.
    pub fn assign(&mut self, param: &Parameter, value: Value) {
        let name = param.name();
        if !param.is_multiple() {
            self.parsed.insert(name.to_string(), value);
            return;
        }

        let merged = match (self.multiples.remove(name), value) {
            (None, Value::Map(map)) => Value::Map(map),
            (None, other) => Value::List(other.into_list()),
            (Some(Value::Map(mut acc)), Value::Map(map)) => {
                for (k, v) in map {
                    insert_grouped(&mut acc, k, v);
                }
                Value::Map(acc)
            }
            (Some(acc), other) => acc.concat(other),
        };
        self.parsed.insert(name.to_string(), merged.clone());
        self.multiples.insert(name.to_string(), merged);
    }

    /// Run a captured value through the pipeline and assign it. A failed
    /// scalar loses its entry; a failed multiple occurrence is skipped.
    pub fn resolve(
        &mut self,
        pipeline: &Pipeline<'_>,
        param: &Parameter,
        raw: Value,
        errors: &mut ErrorAggregator,
    ) -> Result<(), ParseError> {
        match pipeline.process(param, raw) {
            Ok(value) => self.assign(param, value),
            Err(errs) => {
                if !param.is_multiple() {
                    self.parsed.shift_remove(param.name());
                }
                errors.record_all(errs)?;
            }
        }
        Ok(())
    }

    pub fn into_parsed(self) -> IndexMap<String, Value> {
        self.parsed
    }
}
