//! Environment parser. Reads `NAME=value` tokens from argv first, then the
//! environment map handed in by the caller.

use std::collections::{HashMap, VecDeque};

use crate::config::ParseSettings;
use crate::convert::ConversionRegistry;
use crate::error::{ErrorAggregator, ParseError};
use crate::param::{ParamKind, Parameter, ParameterSet};
use crate::parse::checks::{ArityCheck, RequiredCheck};
use crate::parse::state::{collapse, Accumulator, Context, Stage};
use crate::parse::token::{classify, TokenShape};
use crate::pipeline::Pipeline;
use crate::value::Value;

pub struct EnvironmentParser<'a> {
    ctx: Context<'a>,
    pipeline: Pipeline<'a>,
    variables: Vec<(String, &'a Parameter)>,
    argv: VecDeque<String>,
    remaining: Vec<String>,
    values: Accumulator,
    errors: ErrorAggregator,
    required: RequiredCheck<'a>,
    arity: ArityCheck<'a>,
}

impl<'a> EnvironmentParser<'a> {
    pub fn new(
        params: &'a ParameterSet,
        registry: &'a ConversionRegistry,
        settings: &'a ParseSettings,
    ) -> Self {
        let ctx = Context::new(registry, settings);
        Self {
            ctx,
            pipeline: ctx.pipeline(),
            variables: params
                .of_kind(ParamKind::Env)
                .map(|p| (p.variable_name(), p))
                .collect(),
            argv: VecDeque::new(),
            remaining: Vec::new(),
            values: Accumulator::new(),
            errors: ctx.aggregator(),
            required: RequiredCheck::new(),
            arity: ArityCheck::new(),
        }
    }

    pub fn parse(
        mut self,
        argv: Vec<String>,
        env: &HashMap<String, String>,
    ) -> Result<Stage, ParseError> {
        self.argv = argv.into();

        for &(_, param) in &self.variables {
            match param.default_value() {
                Some(default) => self.values.seed(param.name(), default),
                None => self.required.add(param),
            }
            self.arity.add(param);
        }

        while let Some(token) = self.argv.pop_front() {
            if classify(&token) != TokenShape::Env {
                self.remaining.push(token);
                continue;
            }
            self.process_token(token)?;
        }

        // The map comes second: argv occurrences precede it.
        for (variable, param) in &self.variables {
            let Some(value) = env.get(variable) else {
                continue;
            };
            tracing::trace!(variable = %variable, "Environment map value");
            let raw = if self.ctx.is_multi_argument(param) {
                collapse(self.ctx.split_value(value.clone()))
            } else {
                Some(Value::Str(value.clone()))
            };
            self.required.observe(param.name());
            self.values.count(param.name());
            self.values.resolve(
                &self.pipeline,
                param,
                raw.unwrap_or_else(|| Value::from("")),
                &mut self.errors,
            )?;
        }

        self.arity.check(self.values.counts(), &mut self.errors)?;
        self.required.finish(&mut self.errors)?;

        let stage = Stage {
            parsed: self.values.into_parsed(),
            remaining: self.remaining,
            errors: self.errors.into_errors(),
        };
        tracing::debug!(
            parsed = stage.parsed.len(),
            remaining = stage.remaining.len(),
            errors = stage.errors.len(),
            "Environment parsed"
        );
        Ok(stage)
    }

    fn process_token(&mut self, token: String) -> Result<(), ParseError> {
        let Some((variable, value)) = token.split_once('=') else {
            self.remaining.push(token);
            return Ok(());
        };
        let Some(param) = self.find(variable) else {
            if self.ctx.settings.check_invalid_params {
                return self.errors.record(ParseError::invalid_parameter(variable));
            }
            self.remaining.push(token);
            return Ok(());
        };
        tracing::trace!(variable = %variable, "Environment token");

        let multi = self.ctx.is_multi_argument(param);
        let mut values = if multi {
            self.ctx.split_value(value.to_string())
        } else {
            vec![value.to_string()]
        };
        if multi {
            values.extend(self.ctx.consume_while(&mut self.argv, |t| {
                classify(t) == TokenShape::Argument
            }));
        }

        self.required.observe(param.name());
        self.values.count(param.name());
        let raw = collapse(values).unwrap_or_else(|| Value::from(""));
        self.values
            .resolve(&self.pipeline, param, raw, &mut self.errors)
    }

    fn find(&self, variable: &str) -> Option<&'a Parameter> {
        self.variables
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, param)| *param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::param::Arity;

    fn parse_with(
        params: Vec<Parameter>,
        argv: &[&str],
        env: &[(&str, &str)],
        settings: ParseSettings,
    ) -> Stage {
        let mut set = ParameterSet::new();
        for p in params {
            set.add(p).unwrap();
        }
        let registry = ConversionRegistry::with_builtins();
        let argv = argv.iter().map(|s| s.to_string()).collect();
        let env = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvironmentParser::new(&set, &registry, &settings)
            .parse(argv, &env)
            .unwrap()
    }

    fn parse(params: Vec<Parameter>, argv: &[&str], env: &[(&str, &str)]) -> Stage {
        parse_with(params, argv, env, ParseSettings::default())
    }

    #[test]
    fn argv_and_map_merge() {
        let stage = parse(
            vec![Parameter::env("foo"), Parameter::env("bar")],
            &["FOO=12"],
            &[("BAR", "true"), ("PATH", "/usr/bin")],
        );
        assert_eq!(stage.parsed.get("foo"), Some(&Value::from("12")));
        assert_eq!(stage.parsed.get("bar"), Some(&Value::from("true")));
        assert!(stage.errors.is_empty());
    }

    #[test]
    fn map_value_wins_for_scalars() {
        let stage = parse(vec![Parameter::env("foo")], &["FOO=argv"], &[("FOO", "map")]);
        assert_eq!(stage.parsed.get("foo"), Some(&Value::from("map")));
    }

    #[test]
    fn argv_occurrences_precede_map_value() {
        let stage = parse(
            vec![Parameter::env("foo").arity(Arity::ZERO_OR_MORE)],
            &["FOO=1", "FOO=2"],
            &[("FOO", "3")],
        );
        assert_eq!(stage.parsed.get("foo"), Some(&Value::from(vec!["1", "2", "3"])));
    }

    #[test]
    fn custom_variable_name() {
        let stage = parse(
            vec![Parameter::env("home").variable("APP_HOME")],
            &[],
            &[("APP_HOME", "/srv"), ("HOME", "/root")],
        );
        assert_eq!(stage.parsed.get("home"), Some(&Value::from("/srv")));
    }

    #[test]
    fn dashed_name_maps_to_underscored_variable() {
        let stage = parse(vec![Parameter::env("log-level")], &["LOG_LEVEL=debug"], &[]);
        assert_eq!(stage.parsed.get("log-level"), Some(&Value::from("debug")));
    }

    #[test]
    fn unknown_variable_recorded_or_passed_through() {
        let stage = parse(vec![Parameter::env("foo")], &["NOPE=1", "x"], &[]);
        assert_eq!(stage.errors.messages(), vec!["invalid environment variable NOPE"]);
        assert_eq!(stage.remaining, vec!["x"]);

        let settings = ParseSettings {
            check_invalid_params: false,
            ..ParseSettings::default()
        };
        let stage = parse_with(vec![Parameter::env("foo")], &["NOPE=1", "x"], &[], settings);
        assert!(stage.errors.is_empty());
        assert_eq!(stage.remaining, vec!["NOPE=1", "x"]);
    }

    #[test]
    fn multi_argument_consumes_plain_tokens() {
        let stage = parse(
            vec![Parameter::env("paths").convert("list")],
            &["PATHS=a", "b&c", "OTHER=1", "d"],
            &[],
        );
        assert_eq!(stage.parsed.get("paths"), Some(&Value::from(vec!["a", "b", "c"])));
    }

    #[test]
    fn required_checked_after_both_sources() {
        let stage = parse(
            vec![
                Parameter::env("token").required(),
                Parameter::env("user").required(),
            ],
            &[],
            &[("TOKEN", "abc")],
        );
        assert_eq!(stage.errors.len(), 1);
        assert_eq!(
            stage.errors.first().map(|e| e.kind),
            Some(ErrorKind::MissingParameter)
        );
        assert_eq!(stage.errors.messages(), vec!["need to provide 'USER' environment"]);
    }

    #[test]
    fn map_value_split_like_argv_value() {
        let params = || vec![Parameter::env("tags").convert("list")];
        let from_map = parse(params(), &[], &[("TAGS", "a&b")]);
        let from_argv = parse(params(), &["TAGS=a&b"], &[]);
        assert_eq!(from_map.parsed.get("tags"), Some(&Value::from(vec!["a", "b"])));
        assert_eq!(from_map.parsed.get("tags"), from_argv.parsed.get("tags"));
    }

    #[test]
    fn default_seeded_when_absent() {
        let stage = parse(
            vec![
                Parameter::env("port").default("80"),
                Parameter::env("host").default_with(|| Value::from("localhost")),
            ],
            &[],
            &[],
        );
        assert_eq!(stage.parsed.get("port"), Some(&Value::from("80")));
        assert_eq!(stage.parsed.get("host"), Some(&Value::from("localhost")));
        assert!(stage.errors.is_empty());

        let overridden = parse(vec![Parameter::env("port").default("80")], &[], &[("PORT", "8080")]);
        assert_eq!(overridden.parsed.get("port"), Some(&Value::from("8080")));
    }

    #[test]
    fn default_satisfies_required() {
        let stage = parse(vec![Parameter::env("port").default("80").required()], &[], &[]);
        assert_eq!(stage.parsed.get("port"), Some(&Value::from("80")));
        assert!(stage.errors.is_empty(), "{:?}", stage.errors.messages());
    }

    #[test]
    fn conversion_runs_on_map_values() {
        let stage = parse(
            vec![Parameter::env("port").convert("int")],
            &[],
            &[("PORT", "8080")],
        );
        assert_eq!(stage.parsed.get("port"), Some(&Value::Int(8080)));
    }
}
