//! Declarative command definitions read from TOML.
//!
//! ```toml
//! [settings]
//! error_mode = "collect"
//!
//! [[option]]
//! name = "verbose"
//! short = "-v"
//!
//! [[keyword]]
//! name = "level"
//! convert = "int"
//! permit = [1, 2, 3]
//! default = 1
//!
//! [[argument]]
//! name = "files"
//! arity = "one_or_more"
//! convert = "path"
//! ```

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;
use crate::config::types::ParseSettings;
use crate::param::{Arity, Parameter, ParameterSet};
use crate::value::Value;

/// Parameters of one command, grouped by kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandDefinition {
    #[serde(default)]
    pub settings: Option<ParseSettings>,
    #[serde(default, rename = "argument")]
    pub arguments: Vec<ParameterDef>,
    #[serde(default, rename = "keyword")]
    pub keywords: Vec<ParameterDef>,
    #[serde(default, rename = "option")]
    pub options: Vec<ParameterDef>,
    #[serde(default, rename = "env")]
    pub env: Vec<ParameterDef>,
}

/// Arity as written in a definition: a raw count or a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArityDef {
    Count(i64),
    /// `any`, `zero_or_more` or `one_or_more`.
    Named(String),
}

impl ArityDef {
    fn resolve(&self, param: &str) -> Result<Arity, ConfigError> {
        let arity = match self {
            ArityDef::Count(n) => Arity::from_raw(*n),
            ArityDef::Named(name) => match name.as_str() {
                "any" | "zero_or_more" => Arity::ZERO_OR_MORE,
                "one_or_more" => Arity::ONE_OR_MORE,
                other => {
                    return Err(ConfigError::ValidationError {
                        message: format!("Parameter '{}' has unknown arity '{}'", param, other),
                    })
                }
            },
        };
        Ok(arity)
    }
}

/// One parameter entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterDef {
    pub name: String,
    #[serde(default)]
    pub arity: Option<ArityDef>,
    /// Registry conversion name (e.g., "int", "path_list").
    #[serde(default)]
    pub convert: Option<String>,
    /// Regex the value's string form must match.
    #[serde(default)]
    pub validate: Option<String>,
    #[serde(default)]
    pub permit: Vec<toml::Value>,
    #[serde(default)]
    pub default: Option<toml::Value>,
    /// Overrides the kind's default requiredness.
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub short: Option<String>,
    #[serde(default)]
    pub long: Option<String>,
    /// Environment variable name (env parameters only).
    #[serde(default)]
    pub variable: Option<String>,
}

impl ParameterDef {
    fn build(&self, base: Parameter) -> Result<Parameter, ConfigError> {
        let mut param = base;

        if let Some(arity) = &self.arity {
            param = param.arity(arity.resolve(&self.name)?);
        }
        if let Some(convert) = &self.convert {
            param = param.convert(convert.as_str());
        }
        if let Some(pattern) = &self.validate {
            let regex = Regex::new(pattern).map_err(|e| ConfigError::ValidationError {
                message: format!("Parameter '{}' has invalid pattern: {}", self.name, e),
            })?;
            param = param.validate(regex);
        }
        if !self.permit.is_empty() {
            param = param.permit(self.permit.iter().map(value_from_toml));
        }
        if let Some(default) = &self.default {
            param = param.default(value_from_toml(default));
        }
        match self.required {
            Some(true) => param = param.required(),
            Some(false) => param = param.optional(),
            None => {}
        }
        if let Some(short) = &self.short {
            param = param.short(short);
        }
        if let Some(long) = &self.long {
            param = param.long(long);
        }
        if let Some(variable) = &self.variable {
            param = param.variable(variable.as_str());
        }

        Ok(param)
    }
}

impl CommandDefinition {
    /// Build the parameter set. Arguments keep their declaration order.
    pub fn to_parameters(&self) -> Result<ParameterSet, ConfigError> {
        let mut set = ParameterSet::new();

        let groups: [(&[ParameterDef], fn(String) -> Parameter); 4] = [
            (&self.arguments, |n| Parameter::argument(n)),
            (&self.keywords, |n| Parameter::keyword(n)),
            (&self.options, |n| Parameter::option(n)),
            (&self.env, |n| Parameter::env(n)),
        ];
        for (defs, make) in groups {
            for def in defs {
                set.add(def.build(make(def.name.clone()))?)?;
            }
        }

        tracing::debug!(parameters = set.len(), "Command definition loaded");
        Ok(set)
    }

    /// Settings from the definition, or the defaults.
    pub fn parse_settings(&self) -> ParseSettings {
        self.settings.clone().unwrap_or_default()
    }
}

/// Plain TOML data into a parser value. Datetimes keep their text form.
pub fn value_from_toml(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::Str(s.clone()),
        toml::Value::Integer(i) => Value::Int(*i),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::Str(dt.to_string()),
        toml::Value::Array(items) => Value::List(items.iter().map(value_from_toml).collect()),
        toml::Value::Table(table) => Value::Map(
            table
                .iter()
                .map(|(k, v)| (k.clone(), value_from_toml(v)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorMode;
    use crate::param::ParamKind;

    const DEFINITION: &str = r#"
[settings]
error_mode = "raise"

[[option]]
name = "verbose"
short = "-v"

[[option]]
name = "size"
long = "--size N"
convert = "int"
default = 3

[[keyword]]
name = "level"
permit = ["low", "high"]

[[argument]]
name = "files"
arity = "one_or_more"
convert = "path"

[[env]]
name = "home"
variable = "APP_HOME"
required = true
"#;

    #[test]
    fn parses_all_groups() {
        let def: CommandDefinition = toml::from_str(DEFINITION).unwrap();
        assert_eq!(def.parse_settings().error_mode, ErrorMode::Raise);
        assert_eq!(def.options.len(), 2);
        assert_eq!(def.arguments[0].arity, Some(ArityDef::Named("one_or_more".into())));

        let set = def.to_parameters().unwrap();
        assert_eq!(set.len(), 5);

        let size = set.get("size").unwrap();
        assert_eq!(size.kind(), ParamKind::Option);
        assert_eq!(size.default_value(), Some(Value::Int(3)));

        let files = set.get("files").unwrap();
        assert_eq!(files.arity_value(), Arity::ONE_OR_MORE);
        assert!(files.is_required());

        let home = set.get("home").unwrap();
        assert_eq!(home.variable_name(), "APP_HOME");
        assert!(home.is_required());

        let level = set.get("level").unwrap();
        assert_eq!(level.permitted().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn missing_settings_use_defaults() {
        let def: CommandDefinition = toml::from_str("[[keyword]]\nname = \"x\"\n").unwrap();
        assert_eq!(def.parse_settings(), ParseSettings::default());
    }

    #[test]
    fn numeric_arity() {
        let def: CommandDefinition =
            toml::from_str("[[argument]]\nname = \"pair\"\narity = 2\n").unwrap();
        let set = def.to_parameters().unwrap();
        assert_eq!(set.get("pair").map(Parameter::arity_value), Some(Arity::exactly(2)));
    }

    #[test]
    fn rejects_bad_arity_and_pattern() {
        let def: CommandDefinition =
            toml::from_str("[[argument]]\nname = \"x\"\narity = \"lots\"\n").unwrap();
        assert!(matches!(
            def.to_parameters(),
            Err(ConfigError::ValidationError { .. })
        ));

        let def: CommandDefinition =
            toml::from_str("[[keyword]]\nname = \"x\"\nvalidate = \"(\"\n").unwrap();
        assert!(matches!(
            def.to_parameters(),
            Err(ConfigError::ValidationError { .. })
        ));

        let def: CommandDefinition =
            toml::from_str("[[keyword]]\nname = \"x\"\narity = 0\n").unwrap();
        assert!(matches!(def.to_parameters(), Err(ConfigError::Parameter(_))));
    }

    #[test]
    fn duplicate_names_conflict() {
        let def: CommandDefinition =
            toml::from_str("[[keyword]]\nname = \"x\"\n\n[[option]]\nname = \"x\"\n").unwrap();
        assert!(matches!(def.to_parameters(), Err(ConfigError::Parameter(_))));
    }

    #[test]
    fn toml_values_convert() {
        let table: toml::Table = toml::from_str("a = [1, 2.5, true]\nb = { c = \"d\" }\n").unwrap();
        let value = value_from_toml(&toml::Value::Table(table));
        let map = value.as_map().unwrap();
        assert_eq!(
            map.get("a"),
            Some(&Value::List(vec![Value::Int(1), Value::Float(2.5), Value::Bool(true)]))
        );
        assert_eq!(
            map.get("b").and_then(Value::as_map).and_then(|m| m.get("c")),
            Some(&Value::from("d"))
        );
    }
}
