//! Option flag spellings such as `-f`, `--file PATH` or `--color[=WHEN]`.
//!
//! The spelling decides both the name the options parser matches on and
//! whether the option takes a value.

/// Whether an option takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    /// Boolean flag, no value (e.g., `--verbose`).
    Flag,
    /// Requires a value (e.g., `--file PATH`, `--file=PATH`, `-fPATH`).
    Required,
    /// Value may be omitted (e.g., `--color [WHEN]`, `--color[=WHEN]`).
    Optional,
}

/// A parsed flag spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpelling {
    /// Matchable name including dashes: `-f` or `--file`.
    pub name: String,
    /// Value placeholder as written, without brackets.
    pub placeholder: Option<String>,
    pub mode: ValueMode,
}

impl FlagSpelling {
    /// Parse a long spelling: `--name`, `--name VALUE`, `--name=VALUE`,
    /// `--name [VALUE]`, `--name[=VALUE]`.
    pub fn long(spelling: &str) -> Self {
        let spelling = spelling.trim();
        let split = spelling
            .char_indices()
            .skip(2)
            .find(|(_, c)| c.is_whitespace() || *c == '=' || *c == '[')
            .map(|(i, _)| i)
            .unwrap_or(spelling.len());
        let name = spelling[..split].to_string();
        let (placeholder, mode) = placeholder_of(&spelling[split..]);
        Self {
            name,
            placeholder,
            mode,
        }
    }

    /// Parse a short spelling: `-f`, `-f VALUE`, `-fVALUE`, `-f [VALUE]`.
    pub fn short(spelling: &str) -> Self {
        let spelling = spelling.trim();
        let split = spelling
            .char_indices()
            .nth(2)
            .map(|(i, _)| i)
            .unwrap_or(spelling.len());
        let name = spelling[..split].to_string();
        let (placeholder, mode) = placeholder_of(&spelling[split..]);
        Self {
            name,
            placeholder,
            mode,
        }
    }
}

fn placeholder_of(rest: &str) -> (Option<String>, ValueMode) {
    let rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '=');
    let rest = rest.trim_end();
    if rest.is_empty() {
        return (None, ValueMode::Flag);
    }
    if let Some(inner) = rest.strip_prefix('[') {
        let inner = inner.trim_end_matches(']');
        let inner = inner.trim_start_matches('=').trim();
        return (Some(inner.to_string()), ValueMode::Optional);
    }
    (Some(rest.to_string()), ValueMode::Required)
}
