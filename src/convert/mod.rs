//! Conversion registry: named functions turning raw strings into values.
//!
//! Built-ins: `bool`/`boolean`, `date`, `float`, `int`/`integer`,
//! `pathname`/`path`, `regexp`, `sym`/`symbol`, `uri`, `list`/`array`,
//! `map`/`hash`. Every scalar `T` also gets `T_list`, `Ts` and `T_map`.
//!
//! The registry is built once, optionally extended with custom converters,
//! and then shared read-only by every parse.

mod builtin;
mod collection;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

pub(crate) use collection::insert_grouped;
pub use collection::split_list;

use crate::value::Value;

/// Signals that a converter could not handle a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert `{value}` into {target}")]
pub struct ConversionFailure {
    pub value: String,
    pub target: String,
}

impl ConversionFailure {
    pub fn new(value: &Value, target: &str) -> Self {
        Self {
            value: value.to_string(),
            target: target.to_string(),
        }
    }
}

/// What a conversion produces. Collection shapes make a parameter greedy:
/// one occurrence may consume several following tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    List,
    Map,
}

impl Shape {
    pub fn is_collection(&self) -> bool {
        !matches!(self, Shape::Scalar)
    }
}

pub type ConvertFn = Arc<dyn Fn(&Value) -> Result<Value, ConversionFailure> + Send + Sync>;

/// A named conversion function.
#[derive(Clone)]
pub struct Converter {
    name: String,
    shape: Shape,
    func: ConvertFn,
}

impl Converter {
    pub fn new<F>(name: impl Into<String>, shape: Shape, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ConversionFailure> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            shape,
            func: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn apply(&self, value: &Value) -> Result<Value, ConversionFailure> {
        (self.func)(value)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// How a parameter converts its values.
#[derive(Debug, Clone)]
pub enum Conversion {
    /// Looked up in the registry at parse time.
    Named(String),
    /// Inline converter, independent of the registry.
    Custom(Converter),
}

impl Conversion {
    pub fn target_name(&self) -> &str {
        match self {
            Conversion::Named(name) => name,
            Conversion::Custom(c) => c.name(),
        }
    }
}

/// Mapping from conversion name to converter.
#[derive(Debug, Clone)]
pub struct ConversionRegistry {
    converters: HashMap<String, Converter>,
}

impl Default for ConversionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ConversionRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Registry pre-loaded with the built-in conversions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();

        registry.register_scalar(&["bool", "boolean"], builtin::to_bool);
        registry.register_scalar(&["date"], builtin::to_date);
        registry.register_scalar(&["float"], builtin::to_float);
        registry.register_scalar(&["int", "integer"], builtin::to_int);
        registry.register_scalar(&["pathname", "path"], builtin::to_path);
        registry.register_scalar(&["regexp"], builtin::to_regexp);
        registry.register_scalar(&["sym", "symbol"], builtin::to_symbol);
        registry.register_scalar(&["uri"], builtin::to_uri);

        for name in ["list", "array"] {
            registry.insert(Converter::new(name, Shape::List, collection::to_list));
        }
        for name in ["map", "hash"] {
            registry.insert(Converter::new(name, Shape::Map, collection::to_map));
        }

        registry
    }

    /// Register a converter. Scalars also get `_list`, plural and `_map`
    /// variants built on the list and map splitters.
    pub fn register<F>(&mut self, name: &str, shape: Shape, f: F)
    where
        F: Fn(&Value) -> Result<Value, ConversionFailure> + Send + Sync + 'static,
    {
        match shape {
            Shape::Scalar => self.register_scalar(&[name], f),
            _ => self.insert(Converter::new(name, shape, f)),
        }
    }

    fn register_scalar<F>(&mut self, names: &[&str], f: F)
    where
        F: Fn(&Value) -> Result<Value, ConversionFailure> + Send + Sync + 'static,
    {
        let scalar: ConvertFn = Arc::new(f);

        for name in names {
            self.insert(Converter {
                name: name.to_string(),
                shape: Shape::Scalar,
                func: Arc::clone(&scalar),
            });

            for list_name in [format!("{}_list", name), format!("{}s", name)] {
                let inner = Arc::clone(&scalar);
                self.insert(Converter::new(list_name, Shape::List, move |v| {
                    collection::list_of(v, |item| inner(item))
                }));
            }

            let inner = Arc::clone(&scalar);
            self.insert(Converter::new(format!("{}_map", name), Shape::Map, move |v| {
                collection::map_of(v, |item| inner(item))
            }));
        }
    }

    fn insert(&mut self, converter: Converter) {
        tracing::trace!(name = converter.name(), "Registered conversion");
        self.converters.insert(converter.name.clone(), converter);
    }

    pub fn get(&self, name: &str) -> Option<&Converter> {
        self.converters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    /// Shape produced by a conversion; unknown names count as scalar.
    pub fn shape_of(&self, conversion: &Conversion) -> Shape {
        match conversion {
            Conversion::Named(name) => self.get(name).map(Converter::shape).unwrap_or(Shape::Scalar),
            Conversion::Custom(c) => c.shape(),
        }
    }

    pub fn convert(&self, conversion: &Conversion, value: &Value) -> Result<Value, ConversionFailure> {
        match conversion {
            Conversion::Named(name) => match self.get(name) {
                Some(converter) => converter.apply(value),
                None => Err(ConversionFailure::new(value, name)),
            },
            Conversion::Custom(c) => c.apply(value),
        }
    }
}
