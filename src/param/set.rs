//! Parameter set: the registered parameters of one command.

use crate::error::{ErrorKind, ParseError};
use crate::param::{ParamKind, Parameter};

/// Ordered, conflict-free collection of parameters.
///
/// Cloning produces an independent set; descriptors share only immutable
/// closures, so a derived command can extend its clone freely.
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter, rejecting zero arity and name or flag clashes.
    pub fn add(&mut self, param: Parameter) -> Result<(), ParseError> {
        let param = param.with_default_spelling();

        if !param.arity_value().is_valid() {
            return Err(ParseError::new(
                ErrorKind::InvalidArity,
                format!("parameter '{}' cannot have zero arity", param.name()),
            )
            .with_parameter(param.name()));
        }

        if self.get(param.name()).is_some() {
            return Err(ParseError::conflict(param.name(), "name already registered"));
        }

        if param.kind() == ParamKind::Option {
            for spelling in [param.short_flag(), param.long_flag()].into_iter().flatten() {
                if let Some(other) = self.option_with_flag(&spelling.name) {
                    return Err(ParseError::conflict(
                        param.name(),
                        format!("flag {} already used by '{}'", spelling.name, other.name()),
                    ));
                }
            }
        }

        if param.kind() == ParamKind::Env {
            let variable = param.variable_name();
            if let Some(other) = self
                .of_kind(ParamKind::Env)
                .find(|p| p.variable_name() == variable)
            {
                return Err(ParseError::conflict(
                    param.name(),
                    format!("variable {} already used by '{}'", variable, other.name()),
                ));
            }
        }

        tracing::trace!(name = param.name(), kind = param.kind().as_str(), "Registered parameter");
        self.params.push(param);
        Ok(())
    }

    /// Chaining form of [`ParameterSet::add`].
    pub fn with(mut self, param: Parameter) -> Result<Self, ParseError> {
        self.add(param)?;
        Ok(self)
    }

    /// Register every parameter of `other` after the existing ones.
    pub fn extend(&mut self, other: &ParameterSet) -> Result<(), ParseError> {
        for param in &other.params {
            self.add(param.clone())?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    /// Parameters of one kind, in declaration order.
    pub fn of_kind(&self, kind: ParamKind) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(move |p| p.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn option_with_flag(&self, flag: &str) -> Option<&Parameter> {
        self.of_kind(ParamKind::Option).find(|p| {
            p.short_flag().is_some_and(|s| s.name == flag)
                || p.long_flag().is_some_and(|s| s.name == flag)
        })
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Arity;

    #[test]
    fn duplicate_name_conflicts() {
        let mut set = ParameterSet::new();
        set.add(Parameter::argument("foo")).unwrap();
        let err = set.add(Parameter::keyword("foo")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParameterConflict);
        assert_eq!(err.parameter.as_deref(), Some("foo"));
    }

    #[test]
    fn duplicate_short_flag_conflicts() {
        let mut set = ParameterSet::new();
        set.add(Parameter::option("force").short("-f")).unwrap();
        let err = set.add(Parameter::option("file").short("-f PATH")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParameterConflict);
        assert!(err.message.contains("-f"));
    }

    #[test]
    fn zero_arity_rejected() {
        let err = ParameterSet::new()
            .with(Parameter::argument("foo").arity(Arity::from_raw(0)))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArity);
    }

    #[test]
    fn option_without_spelling_gets_long_flag() {
        let set = ParameterSet::new().with(Parameter::option("dry_run")).unwrap();
        let param = set.get("dry_run").unwrap();
        assert_eq!(param.long_flag().map(|s| s.name.as_str()), Some("--dry-run"));
    }

    #[test]
    fn clone_then_extend_leaves_original_untouched() {
        let base = ParameterSet::new().with(Parameter::argument("foo")).unwrap();
        let mut derived = base.clone();
        derived.add(Parameter::argument("bar")).unwrap();

        assert_eq!(base.len(), 1);
        assert_eq!(derived.len(), 2);
        assert!(derived.extend(&base).is_err());
    }
}
