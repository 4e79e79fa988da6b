use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;

use paramline::error::{ErrorMode, Errors};
use paramline::logging::init_tracing;
use paramline::{CommandDefinition, ParseSettings, Parser};

/// Parse a command line against a TOML command definition and print the
/// outcome as JSON.
#[derive(ClapParser, Debug)]
#[command(name = "paramline", version, about, long_about = None)]
struct Cli {
    /// Command definition with [[option]], [[keyword]], [[argument]] and [[env]] tables
    #[arg(short = 'd', long = "definition", value_name = "FILE")]
    definition: PathBuf,

    /// Parse settings, overriding the definition's [settings] table
    #[arg(short = 's', long = "settings", value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Stop at the first error instead of collecting them all
    #[arg(long = "raise")]
    raise: bool,

    /// Tokens to parse (pass them after `--`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGV")]
    argv: Vec<String>,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// Returns whether the parse was error-free.
fn run(cli: Cli) -> Result<bool> {
    let definition = CommandDefinition::load_from(&cli.definition)
        .with_context(|| format!("loading definition {}", cli.definition.display()))?;

    let mut settings = match &cli.settings {
        Some(path) => ParseSettings::load_from(path)
            .with_context(|| format!("loading settings {}", path.display()))?,
        None => definition.parse_settings(),
    };
    if cli.raise {
        settings.error_mode = ErrorMode::Raise;
    }

    let params = definition.to_parameters()?;
    let parser = Parser::new(params).with_settings(settings);

    let env: HashMap<String, String> = std::env::vars().collect();
    let (json, valid) = match parser.parse(cli.argv, &env) {
        Ok(outcome) => (outcome.to_json(), outcome.is_valid()),
        Err(err) => {
            let mut errors = Errors::new();
            errors.push(err);
            (serde_json::json!({ "errors": errors.to_json() }), false)
        }
    };

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(valid)
}
