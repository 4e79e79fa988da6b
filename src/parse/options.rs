//! Options parser: short flags, short clusters and long options.
//!
//! ```text
//! -v            boolean flag
//! -vqf FILE     cluster: -v, -q, then -f takes FILE
//! -fFILE        value glued to a short flag
//! --file FILE   value in the next token
//! --file=FILE   value after '='
//! --fi=FILE     unambiguous prefix of --file
//! ```

use std::collections::{HashMap, VecDeque};

use crate::config::ParseSettings;
use crate::convert::ConversionRegistry;
use crate::error::{ErrorAggregator, ParseError};
use crate::param::{ParamKind, Parameter, ParameterSet, ValueMode};
use crate::parse::checks::{ArityCheck, RequiredCheck};
use crate::parse::state::{collapse, Accumulator, Context, Stage};
use crate::parse::token::is_option;
use crate::pipeline::Pipeline;
use crate::value::Value;

/// What one option occurrence captured.
#[derive(Debug)]
enum Captured {
    /// A raw value for the pipeline.
    Value(Value),
    /// Flag, or optional value left out.
    Present,
    /// Required value absent; already reported.
    Missing,
}

/// Parses option-shaped tokens. Everything else goes to `remaining`.
pub struct OptionsParser<'a> {
    ctx: Context<'a>,
    pipeline: Pipeline<'a>,
    options: Vec<&'a Parameter>,
    shorts: HashMap<&'a str, &'a Parameter>,
    longs: Vec<(&'a str, &'a Parameter)>,
    argv: VecDeque<String>,
    remaining: Vec<String>,
    values: Accumulator,
    errors: ErrorAggregator,
    required: RequiredCheck<'a>,
    arity: ArityCheck<'a>,
}

impl<'a> OptionsParser<'a> {
    pub fn new(
        params: &'a ParameterSet,
        registry: &'a ConversionRegistry,
        settings: &'a ParseSettings,
    ) -> Self {
        let ctx = Context::new(registry, settings);
        let options: Vec<&Parameter> = params.of_kind(ParamKind::Option).collect();

        let mut shorts = HashMap::new();
        let mut longs = Vec::new();
        for &param in &options {
            if let Some(short) = param.short_flag() {
                shorts.insert(short.name.as_str(), param);
            }
            if let Some(long) = param.long_flag() {
                longs.push((long.name.as_str(), param));
            }
        }

        Self {
            ctx,
            pipeline: ctx.pipeline(),
            options,
            shorts,
            longs,
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
        self.seed();

        while !self.argv.is_empty() {
            let Some((param, captured)) = self.next_option()? else {
                continue;
            };
            self.required.observe(param.name());
            self.values.count(param.name());

            match captured {
                Captured::Value(raw) => {
                    self.values
                        .resolve(&self.pipeline, param, raw, &mut self.errors)?;
                }
                Captured::Present => self.values.assign(param, Value::Bool(true)),
                Captured::Missing => {}
            }
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
            "Options parsed"
        );
        Ok(stage)
    }

    /// Defaults first; flags without one start out `false`.
    fn seed(&mut self) {
        for &param in &self.options {
            if let Some(default) = param.default_value() {
                self.values.seed(param.name(), default);
            } else if param.value_mode() == ValueMode::Flag {
                self.values.seed(param.name(), Value::Bool(false));
            } else {
                self.required.add(param);
            }
            self.arity.add(param);
        }
    }

    fn next_option(&mut self) -> Result<Option<(&'a Parameter, Captured)>, ParseError> {
        while let Some(front) = self.argv.front() {
            if is_option(front) {
                break;
            }
            if let Some(token) = self.argv.pop_front() {
                self.remaining.push(token);
            }
        }

        let Some(token) = self.argv.pop_front() else {
            return Ok(None);
        };
        tracing::trace!(token = %token, "Option token");

        if token.starts_with("--") {
            self.process_long(token)
        } else {
            self.process_short(token)
        }
    }

    fn process_long(&mut self, token: String) -> Result<Option<(&'a Parameter, Captured)>, ParseError> {
        let (long, attached) = split_long(&token);

        if let Some(param) = self.find_long(&long) {
            let captured = self.take_value(param, &long, attached)?;
            return Ok(Some((param, captured)));
        }

        // Abbreviated (`--fi` for `--file`) or glued (`--file10`).
        let matches: Vec<(&'a str, &'a Parameter)> = self
            .longs
            .iter()
            .filter(|(name, _)| name.starts_with(long.as_str()) || long.starts_with(name))
            .copied()
            .collect();

        match matches.as_slice() {
            [] => {
                self.reject(&long, token)?;
                Ok(None)
            }
            &[(name, param)] => {
                let glued = long
                    .strip_prefix(name)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string);
                if glued.is_some() && param.value_mode() == ValueMode::Flag {
                    self.reject(&long, token)?;
                    return Ok(None);
                }
                let attached = attached.or(glued);
                let captured = self.take_value(param, name, attached)?;
                Ok(Some((param, captured)))
            }
            many => {
                let names: Vec<&str> = many.iter().map(|(name, _)| *name).collect();
                self.errors.record(ParseError::ambiguous_option(&long, &names))?;
                Ok(None)
            }
        }
    }

    fn process_short(&mut self, token: String) -> Result<Option<(&'a Parameter, Captured)>, ParseError> {
        let split = token
            .char_indices()
            .nth(2)
            .map(|(i, _)| i)
            .unwrap_or(token.len());
        let short = token[..split].to_string();
        let rest = token[split..].to_string();

        let Some(param) = self.shorts.get(short.as_str()).copied() else {
            self.reject(&short, token)?;
            return Ok(None);
        };

        if param.value_mode() == ValueMode::Flag {
            if rest.starts_with('-') {
                // A dash cannot continue a cluster; `-a-b` is not `-a --b`.
                self.reject(&token, rest)?;
            } else if !rest.is_empty() {
                // `-abc` → `-a`, then `-bc` on the next round.
                self.argv.push_front(format!("-{}", rest));
            }
            return Ok(Some((param, Captured::Present)));
        }

        let attached = Some(rest).filter(|r| !r.is_empty());
        let captured = self.take_value(param, &short, attached)?;
        Ok(Some((param, captured)))
    }

    /// Resolve the value for a matched option. Attached text wins over the
    /// next token; greedy options keep reading until the next option.
    /// `Some("")` is an explicitly empty value (`--file=`) and never reads on.
    fn take_value(
        &mut self,
        param: &'a Parameter,
        spelling: &str,
        attached: Option<String>,
    ) -> Result<Captured, ParseError> {
        let mode = param.value_mode();

        match mode {
            ValueMode::Flag => return Ok(Captured::Present),
            ValueMode::Optional
                if attached.is_none() && !self.argv.front().is_some_and(|t| !is_option(t)) =>
            {
                return Ok(Captured::Present)
            }
            _ => {}
        }

        let multi = self.ctx.is_multi_argument(param);
        let explicit_empty = attached.as_deref() == Some("");
        let mut values = Vec::new();
        match attached {
            Some(value) if value.is_empty() => {}
            Some(value) if multi => values.extend(self.ctx.split_value(value)),
            Some(value) => values.push(value),
            None if !multi => values.extend(self.argv.pop_front()),
            None => {}
        }
        if multi && !explicit_empty {
            values.extend(self.ctx.consume_while(&mut self.argv, |t| !is_option(t)));
        }

        match collapse(values) {
            Some(raw) => Ok(Captured::Value(raw)),
            None if mode == ValueMode::Optional => Ok(Captured::Present),
            None => {
                self.errors
                    .record(ParseError::missing_argument(param, spelling))?;
                Ok(Captured::Missing)
            }
        }
    }

    fn find_long(&self, long: &str) -> Option<&'a Parameter> {
        self.longs
            .iter()
            .find(|(name, _)| *name == long)
            .map(|(_, param)| *param)
    }

    /// Unknown flag: an error, or passed through when checking is off.
    fn reject(&mut self, flag: &str, token: String) -> Result<(), ParseError> {
        if self.ctx.settings.check_invalid_params {
            self.errors.record(ParseError::invalid_option(flag))
        } else {
            self.remaining.push(token);
            Ok(())
        }
    }
}

/// Split `--name=value` or `--name value` into the name and attached text.
fn split_long(token: &str) -> (String, Option<String>) {
    match token.find(|c: char| c == '=' || c.is_whitespace()) {
        Some(i) => {
            let rest = &token[i..];
            let value = match rest.strip_prefix('=') {
                Some(v) => v,
                None => rest.trim_start(),
            };
            (token[..i].to_string(), Some(value.to_string()))
        }
        None => (token.to_string(), None),
    }
}
