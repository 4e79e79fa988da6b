use indexmap::IndexMap;

use crate::error::Errors;
use crate::value::Value;

/// Merged result of a full parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    values: IndexMap<String, Value>,
    remaining: Vec<String>,
    errors: Errors,
}

impl ParseOutcome {
    pub(crate) fn new(values: IndexMap<String, Value>, remaining: Vec<String>, errors: Errors) -> Self {
        Self {
            values,
            remaining,
            errors,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Resolved values in the order their parsers produced them.
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Tokens no parser claimed, followed by everything after the
    /// end-of-options marker.
    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let values: serde_json::Map<String, serde_json::Value> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::json!({
            "values": values,
            "remaining": self.remaining,
            "errors": self.errors.to_json(),
        })
    }

    pub fn into_parts(self) -> (IndexMap<String, Value>, Vec<String>, Errors) {
        (self.values, self.remaining, self.errors)
    }
}
