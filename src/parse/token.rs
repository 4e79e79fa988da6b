//! Token classifier: decides what a raw token looks like, independent of
//! any registered parameter.

/// Shape of a raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenShape {
    /// `-x`, `-xyz`, `--name`, `--name=value`.
    Option,
    /// `name=value` with a lowercase identifier.
    Keyword,
    /// `NAME=value` with an uppercase identifier.
    Env,
    /// Anything else.
    Argument,
}

/// Classify a token. Embedded whitespace forces argument shape, since such a
/// token cannot be a well-formed flag or assignment.
///
/// The options parser still reads `--name value` glued in one token as an
/// option; it matches on [`is_option`] directly.
pub fn classify(token: &str) -> TokenShape {
    if has_whitespace(token) {
        TokenShape::Argument
    } else if is_option(token) {
        TokenShape::Option
    } else if is_keyword(token) {
        TokenShape::Keyword
    } else if is_env(token) {
        TokenShape::Env
    } else {
        TokenShape::Argument
    }
}

/// One or two dashes followed by a non-dash character.
pub fn is_option(token: &str) -> bool {
    let Some(rest) = token.strip_prefix('-') else {
        return false;
    };
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    rest.chars().next().is_some_and(|c| c != '-')
}

pub fn is_keyword(token: &str) -> bool {
    let Some((ident, _)) = token.split_once('=') else {
        return false;
    };
    let mut chars = ident.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_lowercase() || first.is_ascii_digit() || first == '_')
        && chars.all(|c| c.is_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

pub fn is_env(token: &str) -> bool {
    let Some((ident, _)) = token.split_once('=') else {
        return false;
    };
    !ident.is_empty()
        && ident.chars().any(char::is_uppercase)
        && ident
            .chars()
            .all(|c| c.is_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Argument-shaped: not an option, keyword or env assignment, or carrying
/// embedded whitespace.
pub fn is_argument(token: &str) -> bool {
    has_whitespace(token) || !(is_option(token) || is_keyword(token) || is_env(token))
}

fn has_whitespace(token: &str) -> bool {
    token.chars().any(char::is_whitespace)
}
