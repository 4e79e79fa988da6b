//! Post-pass checks run once per category parser.

use std::collections::HashMap;

use crate::error::{ErrorAggregator, ParseError};
use crate::param::Parameter;

/// Required parameters that have not occurred yet.
#[derive(Debug, Default)]
pub(crate) struct RequiredCheck<'a> {
    pending: Vec<&'a Parameter>,
}

impl<'a> RequiredCheck<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `param` if it is required and has no default to fall back on.
    pub fn add(&mut self, param: &'a Parameter) {
        if param.is_required() && !param.has_default() {
            self.pending.push(param);
        }
    }

    pub fn observe(&mut self, name: &str) {
        self.pending.retain(|p| p.name() != name);
    }

    /// Report every parameter still pending.
    pub fn finish(self, errors: &mut ErrorAggregator) -> Result<(), ParseError> {
        for param in self.pending {
            errors.record(ParseError::missing_parameter(param))?;
        }
        Ok(())
    }
}

/// Occurrence counts against declared arity for multi-occurrence parameters.
#[derive(Debug, Default)]
pub(crate) struct ArityCheck<'a> {
    multiples: Vec<&'a Parameter>,
}

impl<'a> ArityCheck<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, param: &'a Parameter) {
        if param.is_multiple() {
            self.multiples.push(param);
        }
    }

    /// Parameters that never occurred are left to the required check.
    pub fn check(
        &self,
        counts: &HashMap<String, usize>,
        errors: &mut ErrorAggregator,
    ) -> Result<(), ParseError> {
        for param in &self.multiples {
            let count = counts.get(param.name()).copied().unwrap_or(0);
            if count > 0 && !param.arity_value().accepts(count) {
                errors.record(ParseError::invalid_arity(param, count))?;
            }
        }
        Ok(())
    }
}
