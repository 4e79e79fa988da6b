//! paramline: command-line invocation parser.
//!
//! Tokens are distributed over four parameter categories (options,
//! keywords, positional arguments, environment variables), each captured
//! value runs through convert → validate → permit, and the result comes
//! back as values, unclaimed tokens and errors.
//!
//! ```no_run
//! use std::collections::HashMap;
//! use paramline::{Arity, Parameter, ParameterSet, Parser};
//!
//! let params = ParameterSet::new()
//!     .with(Parameter::option("verbose").short("-v"))?
//!     .with(Parameter::argument("files").arity(Arity::ONE_OR_MORE).convert("path"))?;
//! let outcome = Parser::new(params).parse(["-v", "a.txt"], &HashMap::new())?;
//! assert!(outcome.is_valid());
//! # Ok::<(), paramline::ParseError>(())
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod logging;
pub mod param;
pub mod parse;
pub mod pipeline;
pub mod value;

pub use config::{CommandDefinition, ConfigError, ParseSettings};
pub use convert::{Conversion, ConversionFailure, ConversionRegistry, Converter, Shape};
pub use error::{ErrorAggregator, ErrorKind, ErrorMode, Errors, ParseError};
pub use param::{Arity, ParamKind, Parameter, ParameterSet};
pub use parse::{ParseOutcome, Parser};
pub use value::Value;
