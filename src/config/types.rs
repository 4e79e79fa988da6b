use serde::{Deserialize, Serialize};

use crate::error::ErrorMode;

/// Knobs that change how a command line is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSettings {
    /// `raise` stops at the first error, `collect` gathers them all.
    #[serde(default)]
    pub error_mode: ErrorMode,
    /// Report unknown options and environment variables (default: true).
    /// When off they are passed through untouched.
    #[serde(default = "default_check_invalid_params")]
    pub check_invalid_params: bool,
    /// Marker after which tokens are never parsed (default: "--").
    /// An empty marker disables the split.
    #[serde(default = "default_end_of_options")]
    pub end_of_options: String,
    /// Splits one token into several values for greedy parameters
    /// (default: "&").
    #[serde(default = "default_value_separator")]
    pub value_separator: String,
}

fn default_check_invalid_params() -> bool {
    true
}

fn default_end_of_options() -> String {
    "--".to_string()
}

fn default_value_separator() -> String {
    "&".to_string()
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::default(),
            check_invalid_params: default_check_invalid_params(),
            end_of_options: default_end_of_options(),
            value_separator: default_value_separator(),
        }
    }
}
