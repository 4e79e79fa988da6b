//! Keywords parser: `name=value` tokens.
//!
//! Unknown keywords are never an error here; they stay in `remaining` for
//! the arguments parser to pick up.

use std::collections::{HashMap, VecDeque};

use crate::config::ParseSettings;
use crate::convert::ConversionRegistry;
use crate::error::{ErrorAggregator, ParseError};
use crate::param::{ParamKind, Parameter, ParameterSet};
use crate::parse::checks::{ArityCheck, RequiredCheck};
use crate::parse::state::{collapse, Accumulator, Context, Stage};
use crate::parse::token::{classify, TokenShape};
use crate::pipeline::Pipeline;

pub struct KeywordsParser<'a> {
    ctx: Context<'a>,
    pipeline: Pipeline<'a>,
    keywords: Vec<&'a Parameter>,
    by_name: HashMap<String, &'a Parameter>,
    argv: VecDeque<String>,
    remaining: Vec<String>,
    values: Accumulator,
    errors: ErrorAggregator,
    required: RequiredCheck<'a>,
    arity: ArityCheck<'a>,
}

impl<'a> KeywordsParser<'a> {
    pub fn new(
        params: &'a ParameterSet,
        registry: &'a ConversionRegistry,
        settings: &'a ParseSettings,
    ) -> Self {
        let ctx = Context::new(registry, settings);
        let keywords: Vec<&Parameter> = params.of_kind(ParamKind::Keyword).collect();

        // Both `dry-run=` and `dry_run=` reach the `dry_run` keyword.
        let mut by_name = HashMap::new();
        for &param in &keywords {
            by_name.insert(param.name().to_string(), param);
            by_name.insert(param.keyword_name(), param);
        }

        Self {
            ctx,
            pipeline: ctx.pipeline(),
            keywords,
            by_name,
            argv: VecDeque::new(),
            remaining: Vec::new(),
            values: Accumulator::new(),
            errors: ctx.aggregator(),
            required: RequiredCheck::new(),
            arity: ArityCheck::new(),
        }
    }

    pub fn parse(mut self, argv: Vec<String>) -> Result<Stage, ParseError> {
        self.argv = argv.into();

        for &param in &self.keywords {
            match param.default_value() {
                Some(default) => self.values.seed(param.name(), default),
                None => self.required.add(param),
            }
            self.arity.add(param);
        }

        while let Some(token) = self.argv.pop_front() {
            if classify(&token) != TokenShape::Keyword {
                self.remaining.push(token);
                continue;
            }
            self.process(token)?;
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
            "Keywords parsed"
        );
        Ok(stage)
    }

    fn process(&mut self, token: String) -> Result<(), ParseError> {
        let Some((key, value)) = token.split_once('=') else {
            self.remaining.push(token);
            return Ok(());
        };
        let Some(param) = self.by_name.get(key).copied() else {
            tracing::trace!(token = %token, "Unknown keyword passed through");
            self.remaining.push(token);
            return Ok(());
        };
        tracing::trace!(keyword = param.name(), "Keyword token");

        let multi = self.ctx.is_multi_argument(param);
        let mut values = Vec::new();
        if !value.is_empty() {
            if multi {
                values.extend(self.ctx.split_value(value.to_string()));
            } else {
                values.push(value.to_string());
            }
        }
        if multi {
            values.extend(self.ctx.consume_while(&mut self.argv, |t| {
                !matches!(classify(t), TokenShape::Option | TokenShape::Keyword)
            }));
        }

        self.required.observe(param.name());
        self.values.count(param.name());

        match collapse(values) {
            Some(raw) => self
                .values
                .resolve(&self.pipeline, param, raw, &mut self.errors),
            None => self
                .errors
                .record(ParseError::missing_argument(param, &param.keyword_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::param::Arity;
    use crate::value::Value;

    fn parse(params: Vec<Parameter>, argv: &[&str]) -> Stage {
        let mut set = ParameterSet::new();
        for p in params {
            set.add(p).unwrap();
        }
        let registry = ConversionRegistry::with_builtins();
        let settings = ParseSettings::default();
        let argv = argv.iter().map(|s| s.to_string()).collect();
        KeywordsParser::new(&set, &registry, &settings).parse(argv).unwrap()
    }

    #[test]
    fn last_occurrence_wins_for_scalars() {
        let stage = parse(vec![Parameter::keyword("foo")], &["foo=1", "foo=2"]);
        assert_eq!(stage.parsed.get("foo"), Some(&Value::from("2")));
        assert!(stage.errors.is_empty());
    }

    #[test]
    fn any_arity_accumulates() {
        let stage = parse(
            vec![Parameter::keyword("foo").arity(Arity::ZERO_OR_MORE)],
            &["foo=x", "foo=y"],
        );
        assert_eq!(stage.parsed.get("foo"), Some(&Value::from(vec!["x", "y"])));
    }

    #[test]
    fn unknown_keywords_pass_through() {
        let stage = parse(vec![Parameter::keyword("foo")], &["bar=1", "x", "-v", "foo=2"]);
        assert_eq!(stage.parsed.get("foo"), Some(&Value::from("2")));
        assert_eq!(stage.remaining, vec!["bar=1", "x", "-v"]);
        assert!(stage.errors.is_empty());
    }

    #[test]
    fn dashed_and_underscored_spellings() {
        let params = || vec![Parameter::keyword("dry_run").convert("bool")];
        let dashed = parse(params(), &["dry-run=yes"]);
        assert_eq!(dashed.parsed.get("dry_run"), Some(&Value::Bool(true)));
        let underscored = parse(params(), &["dry_run=no"]);
        assert_eq!(underscored.parsed.get("dry_run"), Some(&Value::Bool(false)));
    }

    #[test]
    fn multi_argument_consumes_following_values() {
        let stage = parse(
            vec![Parameter::keyword("nums").convert("ints")],
            &["nums=1", "2", "3&4", "other=x", "5"],
        );
        assert_eq!(
            stage.parsed.get("nums"),
            Some(&Value::List((1..=4).map(Value::Int).collect()))
        );
        assert_eq!(stage.remaining, vec!["other=x", "5"]);
    }

    #[test]
    fn multi_argument_keeps_tokens_with_whitespace() {
        let stage = parse(
            vec![Parameter::keyword("notes").convert("list")],
            &["notes=first", "x=hello world", "y=2"],
        );
        assert_eq!(
            stage.parsed.get("notes"),
            Some(&Value::from(vec!["first", "x=hello world"]))
        );
        assert_eq!(stage.remaining, vec!["y=2"]);
    }

    #[test]
    fn empty_value_is_missing_argument() {
        let stage = parse(vec![Parameter::keyword("foo")], &["foo="]);
        let err = stage.errors.first().unwrap();
        assert_eq!(err.kind, ErrorKind::MissingArgument);
        assert_eq!(err.message, "keyword foo requires an argument");
    }

    #[test]
    fn default_and_required() {
        let stage = parse(
            vec![
                Parameter::keyword("level").default("1"),
                Parameter::keyword("name").required(),
            ],
            &[],
        );
        assert_eq!(stage.parsed.get("level"), Some(&Value::from("1")));
        assert!(stage.errors.contains_kind(ErrorKind::MissingParameter));
        assert_eq!(stage.errors.messages(), vec!["need to provide 'name' keyword"]);
    }

    #[test]
    fn permitted_values_enforced() {
        let stage = parse(
            vec![Parameter::keyword("mode").permit(["fast", "slow"])],
            &["mode=medium"],
        );
        assert!(stage.parsed.get("mode").is_none());
        assert_eq!(
            stage.errors.first().map(|e| e.kind),
            Some(ErrorKind::UnpermittedArgument)
        );
    }

    #[test]
    fn arity_exact_count() {
        let stage = parse(
            vec![Parameter::keyword("pair").arity(Arity::exactly(2))],
            &["pair=a", "pair=b", "pair=c"],
        );
        assert_eq!(
            stage.errors.messages(),
            vec!["expected keyword pair to appear 2 times but appeared 3 times"]
        );
    }
}
