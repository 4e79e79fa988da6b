//! Value pipeline: conversion, validation and the permitted-set check.
//!
//! ```text
//! raw value → Convert → Validate → Permit → resolved value
//! ```
//!
//! Each stage returns `Result<Value, Vec<ParseError>>`; the first failing
//! stage short-circuits the rest.

use crate::convert::{ConversionRegistry, Shape};
use crate::error::ParseError;
use crate::param::Parameter;
use crate::value::Value;

pub type StageResult = Result<Value, Vec<ParseError>>;

/// Runs captured values through a parameter's stages.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    registry: &'a ConversionRegistry,
}

impl<'a> Pipeline<'a> {
    pub fn new(registry: &'a ConversionRegistry) -> Self {
        Self { registry }
    }

    pub fn process(&self, param: &Parameter, value: Value) -> StageResult {
        self.convert(param, value)
            .and_then(|v| validate(param, v))
            .and_then(|v| check_permitted(param, v))
    }

    fn convert(&self, param: &Parameter, value: Value) -> StageResult {
        let Some(conversion) = param.conversion() else {
            return Ok(value);
        };
        let convert_one = |item: &Value| {
            self.registry.convert(conversion, item).map_err(|failure| {
                vec![ParseError::invalid_conversion(
                    param,
                    item,
                    &failure.target,
                )]
            })
        };

        match value {
            // Several captured values meeting a scalar conversion: each one converts.
            Value::List(items) if self.registry.shape_of(conversion) == Shape::Scalar => items
                .iter()
                .map(convert_one)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            other => convert_one(&other),
        }
    }
}

/// One error per failing element; an empty list is vacuously valid.
fn validate(param: &Parameter, value: Value) -> StageResult {
    let Some(validator) = param.validator() else {
        return Ok(value);
    };

    let errors: Vec<ParseError> = match &value {
        Value::List(items) => items
            .iter()
            .filter(|item| !validator.accepts(item))
            .map(|item| ParseError::invalid_argument(param, item))
            .collect(),
        Value::Map(map) => map
            .values()
            .flat_map(|v| v.clone().into_list())
            .filter(|item| !validator.accepts(item))
            .map(|item| ParseError::invalid_argument(param, &item))
            .collect(),
        scalar if !validator.accepts(scalar) => vec![ParseError::invalid_argument(param, scalar)],
        _ => Vec::new(),
    };

    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

/// Membership check for scalars, each list element, or each map pair.
fn check_permitted(param: &Parameter, value: Value) -> StageResult {
    let Some(permit) = param.permitted() else {
        return Ok(value);
    };

    let errors: Vec<ParseError> = match &value {
        Value::List(items) => items
            .iter()
            .filter(|item| !permit.contains(item))
            .map(|item| ParseError::unpermitted(param, &item.to_string(), permit))
            .collect(),
        Value::Map(map) => map
            .iter()
            .flat_map(|(k, v)| v.clone().into_list().into_iter().map(move |item| (k, item)))
            .filter(|(k, item)| !pair_permitted(permit, k, item))
            .map(|(k, item)| ParseError::unpermitted(param, &format!("{}={}", k, item), permit))
            .collect(),
        scalar if !permit.contains(scalar) => {
            vec![ParseError::unpermitted(param, &scalar.to_string(), permit)]
        }
        _ => Vec::new(),
    };

    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

/// A pair is permitted when some permitted map holds it, directly or in a
/// list of allowed values under that key.
fn pair_permitted(permit: &[Value], key: &str, item: &Value) -> bool {
    permit.iter().any(|allowed| match allowed {
        Value::Map(map) => map.get(key).is_some_and(|v| match v {
            Value::List(options) => options.contains(item),
            single => single == item,
        }),
        _ => false,
    })
}
