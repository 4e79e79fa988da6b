mod definition;
mod loader;
mod types;

pub use definition::{value_from_toml, ArityDef, CommandDefinition, ParameterDef};
pub use loader::ConfigError;
pub use types::ParseSettings;
