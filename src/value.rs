//! Dynamic values: what a parameter resolves to after conversion.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use indexmap::IndexMap;
use regex::Regex;
use url::Url;

/// A resolved parameter value.
///
/// Raw tokens enter the pipeline as [`Value::Str`] (or [`Value::List`] of
/// strings for multi-argument captures) and leave it as whatever the
/// configured conversion produced.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    Date(NaiveDate),
    Path(PathBuf),
    Regex(Regex),
    Uri(Url),
    List(Vec<Value>),
    /// Insertion-ordered mapping. Repeated keys collapse into a `List` value.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Short type name used in conversion error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Date(_) => "date",
            Value::Path(_) => "path",
            Value::Regex(_) => "regexp",
            Value::Uri(_) => "uri",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Wrap a scalar in a one-element list; lists are returned as-is.
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Value::List(items) => items,
            other => vec![other],
        }
    }

    /// How many values this counts as when compared against an arity.
    pub fn count(&self) -> usize {
        match self {
            Value::List(items) => items.len(),
            Value::Map(map) => map.len(),
            _ => 1,
        }
    }

    /// Append `other` onto `self` so that repeated values form a list.
    pub fn concat(self, other: Value) -> Value {
        let mut items = self.into_list();
        items.extend(other.into_list());
        Value::List(items)
    }

    /// Render for collaborators that speak JSON.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            other => Json::String(other.to_string()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a.as_str() == b.as_str(),
            (Value::Uri(a), Value::Uri(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) | Value::Symbol(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::Regex(r) => f.write_str(r.as_str()),
            Value::Uri(u) => f.write_str(u.as_str()),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    // Escape commas so the list splitter reads the element back whole.
                    f.write_str(&item.to_string().replace(',', "\\,"))?;
                }
                Ok(())
            }
            Value::Map(map) => {
                let mut first = true;
                for (key, value) in map {
                    for item in value.clone().into_list() {
                        if !first {
                            f.write_str("&")?;
                        }
                        first = false;
                        write!(f, "{}={}", key, item)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<PathBuf> for Value {
    fn from(p: PathBuf) -> Self {
        Value::Path(p)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_display_escapes_commas() {
        let value = Value::from(vec!["a", "b,c"]);
        assert_eq!(value.to_string(), "a,b\\,c");
    }

    #[test]
    fn map_display_repeats_keys_for_list_values() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::from(vec!["1", "2"]));
        map.insert("b".to_string(), Value::from("3"));
        assert_eq!(Value::Map(map).to_string(), "a=1&a=2&b=3");
    }

    #[test]
    fn concat_flattens_into_list() {
        let joined = Value::from("x").concat(Value::from(vec!["y", "z"]));
        assert_eq!(joined, Value::from(vec!["x", "y", "z"]));
    }

    #[test]
    fn regex_values_compare_by_pattern() {
        let a = Value::Regex(Regex::new("^a+$").unwrap());
        let b = Value::Regex(Regex::new("^a+$").unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn to_json_keeps_structure() {
        let value = Value::from(vec![Value::Int(1), Value::Bool(true)]);
        assert_eq!(value.to_json(), serde_json::json!([1, true]));
    }
}
