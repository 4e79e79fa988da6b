//! Built-in scalar conversions.

use std::path::PathBuf;

use chrono::NaiveDate;
use regex::Regex;
use url::Url;

use crate::convert::ConversionFailure;
use crate::value::Value;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%b %d %Y"];

fn text<'a>(value: &'a Value, target: &str) -> Result<&'a str, ConversionFailure> {
    match value {
        Value::Str(s) => Ok(s.trim()),
        other => Err(ConversionFailure::new(other, target)),
    }
}

pub fn to_bool(value: &Value) -> Result<Value, ConversionFailure> {
    if let Value::Bool(_) = value {
        return Ok(value.clone());
    }
    match text(value, "bool")?.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" | "t" => Ok(Value::Bool(true)),
        "false" | "no" | "n" | "off" | "0" | "f" => Ok(Value::Bool(false)),
        _ => Err(ConversionFailure::new(value, "bool")),
    }
}

pub fn to_date(value: &Value) -> Result<Value, ConversionFailure> {
    if let Value::Date(_) = value {
        return Ok(value.clone());
    }
    let s = text(value, "date")?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(Value::Date)
        .ok_or_else(|| ConversionFailure::new(value, "date"))
}

pub fn to_float(value: &Value) -> Result<Value, ConversionFailure> {
    match value {
        Value::Float(_) => Ok(value.clone()),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        _ => text(value, "float")?
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ConversionFailure::new(value, "float")),
    }
}

pub fn to_int(value: &Value) -> Result<Value, ConversionFailure> {
    if let Value::Int(_) = value {
        return Ok(value.clone());
    }
    text(value, "int")?
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|_| ConversionFailure::new(value, "int"))
}

pub fn to_path(value: &Value) -> Result<Value, ConversionFailure> {
    match value {
        Value::Path(_) => Ok(value.clone()),
        _ => Ok(Value::Path(PathBuf::from(text(value, "path")?))),
    }
}

pub fn to_regexp(value: &Value) -> Result<Value, ConversionFailure> {
    if let Value::Regex(_) = value {
        return Ok(value.clone());
    }
    Regex::new(text(value, "regexp")?)
        .map(Value::Regex)
        .map_err(|_| ConversionFailure::new(value, "regexp"))
}

pub fn to_symbol(value: &Value) -> Result<Value, ConversionFailure> {
    match value {
        Value::Symbol(_) => Ok(value.clone()),
        _ => Ok(Value::Symbol(text(value, "symbol")?.to_string())),
    }
}

pub fn to_uri(value: &Value) -> Result<Value, ConversionFailure> {
    if let Value::Uri(_) = value {
        return Ok(value.clone());
    }
    Url::parse(text(value, "uri")?)
        .map(Value::Uri)
        .map_err(|_| ConversionFailure::new(value, "uri"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_spellings() {
        for s in ["true", "YES", "y", "On", "1"] {
            assert_eq!(to_bool(&Value::from(s)).unwrap(), Value::Bool(true), "{}", s);
        }
        for s in ["false", "no", "N", "off", "0"] {
            assert_eq!(to_bool(&Value::from(s)).unwrap(), Value::Bool(false), "{}", s);
        }
        assert!(to_bool(&Value::from("maybe")).is_err());
    }

    #[test]
    fn int_rejects_fractions() {
        assert_eq!(to_int(&Value::from(" 12 ")).unwrap(), Value::Int(12));
        assert!(to_int(&Value::from("12.5")).is_err());
        assert!(to_int(&Value::from("abc")).is_err());
    }

    #[test]
    fn float_accepts_ints() {
        assert_eq!(to_float(&Value::from("1.5")).unwrap(), Value::Float(1.5));
        assert_eq!(to_float(&Value::Int(2)).unwrap(), Value::Float(2.0));
    }

    #[test]
    fn date_formats() {
        let expected = Value::Date(NaiveDate::from_ymd_opt(2024, 3, 28).unwrap());
        for s in ["2024-03-28", "2024/03/28", "28-03-2024", "28/03/2024", "Mar 28 2024"] {
            assert_eq!(to_date(&Value::from(s)).unwrap(), expected, "{}", s);
        }
        assert!(to_date(&Value::from("tomorrow")).is_err());
    }

    #[test]
    fn uri_and_regexp() {
        assert!(to_uri(&Value::from("https://example.com/a")).is_ok());
        assert!(to_uri(&Value::from("not a uri")).is_err());
        assert!(to_regexp(&Value::from("^a+$")).is_ok());
        assert!(to_regexp(&Value::from("(")).is_err());
    }

    #[test]
    fn lists_are_not_scalars() {
        assert!(to_int(&Value::from(vec!["1", "2"])).is_err());
    }
}
