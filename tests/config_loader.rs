use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use paramline::config::ParameterDef;
use paramline::{CommandDefinition, ConfigError, ErrorMode, ParamKind, ParseSettings, Parser, Value};
use tempfile::NamedTempFile;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// Test that ParseSettings::default() produces the documented values.
#[test]
fn test_settings_default_values() {
    let settings = ParseSettings::default();

    assert_eq!(settings.error_mode, ErrorMode::Collect);
    assert!(settings.check_invalid_params);
    assert_eq!(settings.end_of_options, "--");
    assert_eq!(settings.value_separator, "&");
    assert!(settings.validate().is_ok());
}

/// Test that a full settings file round-trips every field.
#[test]
fn test_settings_load_full_file() {
    let file = write_temp(
        r#"
error_mode = "raise"
check_invalid_params = false
end_of_options = "---"
value_separator = "+"
"#,
    );
    let settings = ParseSettings::load_from(file.path()).unwrap();

    assert_eq!(settings.error_mode, ErrorMode::Raise);
    assert!(!settings.check_invalid_params);
    assert_eq!(settings.end_of_options, "---");
    assert_eq!(settings.value_separator, "+");
}

/// Test validation fails on a marker with whitespace.
#[test]
fn test_settings_validation_rejects_whitespace_marker() {
    let settings = ParseSettings {
        end_of_options: "- -".to_string(),
        ..ParseSettings::default()
    };
    let result = settings.validate();
    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

/// Test that an unreadable definition reports the path.
#[test]
fn test_definition_missing_file() {
    let err = CommandDefinition::load_from(Path::new("/nonexistent/dir/cmd.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
    assert!(err.to_string().contains("/nonexistent/dir/cmd.toml"));
}

/// Test that malformed TOML is a parse error.
#[test]
fn test_definition_malformed_toml() {
    let file = write_temp("[[option]\nname = ");
    let err = CommandDefinition::load_from(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

/// Test that invalid settings embedded in a definition are rejected.
#[test]
fn test_definition_validates_embedded_settings() {
    let file = write_temp("[settings]\nvalue_separator = \"\"\n");
    let err = CommandDefinition::load_from(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

/// Test loading a definition and parsing with it end to end.
#[test]
fn test_definition_drives_parser() {
    let file = write_temp(
        r#"
[settings]
error_mode = "collect"

[[option]]
name = "verbose"
short = "-v"
long = "--verbose"

[[option]]
name = "jobs"
short = "-j N"
convert = "int"
default = 1

[[keyword]]
name = "profile"
permit = ["debug", "release"]
default = "debug"

[[argument]]
name = "targets"
arity = "any"

[[env]]
name = "build-dir"
convert = "path"
"#,
    );
    let definition = CommandDefinition::load_from(file.path()).unwrap();
    assert_eq!(definition.options.len(), 2);

    let params = definition.to_parameters().unwrap();
    assert_eq!(params.of_kind(ParamKind::Option).count(), 2);
    assert_eq!(
        params.get("build-dir").map(|p| p.variable_name()),
        Some("BUILD_DIR".to_string())
    );

    let parser = Parser::new(params).with_settings(definition.parse_settings());
    let env = HashMap::from([("BUILD_DIR".to_string(), "/tmp/out".to_string())]);
    let outcome = parser
        .parse(["-vj4", "profile=release", "core", "cli"], &env)
        .unwrap();

    assert!(outcome.is_valid(), "{:?}", outcome.errors());
    assert_eq!(outcome.get("verbose"), Some(&Value::Bool(true)));
    assert_eq!(outcome.get("jobs"), Some(&Value::Int(4)));
    assert_eq!(outcome.get("profile"), Some(&Value::from("release")));
    assert_eq!(outcome.get("targets"), Some(&Value::from(vec!["core", "cli"])));
    assert_eq!(outcome.get("build-dir"), Some(&Value::Path("/tmp/out".into())));
}

/// Test that a definition can be built programmatically.
#[test]
fn test_definition_built_in_code() {
    let definition = CommandDefinition {
        keywords: vec![ParameterDef {
            name: "level".to_string(),
            convert: Some("int".to_string()),
            ..ParameterDef::default()
        }],
        ..CommandDefinition::default()
    };
    let params = definition.to_parameters().unwrap();
    let outcome = Parser::new(params)
        .parse(["level=3"], &HashMap::new())
        .unwrap();
    assert_eq!(outcome.get("level"), Some(&Value::Int(3)));
}
