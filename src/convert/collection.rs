//! List and map conversions.
//!
//! Lists split on unescaped commas (`a, b\,c` → `["a", "b,c"]`). Maps split
//! pairs on `&` or whitespace and each pair on its first `=` or `:`;
//! repeated keys gather their values into a list.

use indexmap::IndexMap;

use crate::convert::ConversionFailure;
use crate::value::Value;

/// Split on commas not preceded by a backslash, trimming each element.
pub fn split_list(s: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

pub fn to_list(value: &Value) -> Result<Value, ConversionFailure> {
    match value {
        Value::Str(s) => Ok(Value::List(
            split_list(s).into_iter().map(Value::Str).collect(),
        )),
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Str(s) => out.extend(split_list(s).into_iter().map(Value::Str)),
                    other => out.push(other.clone()),
                }
            }
            Ok(Value::List(out))
        }
        Value::Map(_) => Err(ConversionFailure::new(value, "list")),
        other => Ok(Value::List(vec![other.clone()])),
    }
}

pub fn to_map(value: &Value) -> Result<Value, ConversionFailure> {
    let mut map = IndexMap::new();
    match value {
        Value::Map(_) => return Ok(value.clone()),
        Value::Str(s) => insert_pairs(&mut map, s).ok_or_else(|| ConversionFailure::new(value, "map"))?,
        Value::List(items) => {
            for item in items {
                match item {
                    Value::Str(s) => insert_pairs(&mut map, s)
                        .ok_or_else(|| ConversionFailure::new(value, "map"))?,
                    Value::Map(m) => {
                        for (k, v) in m {
                            insert_grouped(&mut map, k.clone(), v.clone());
                        }
                    }
                    _ => return Err(ConversionFailure::new(value, "map")),
                }
            }
        }
        _ => return Err(ConversionFailure::new(value, "map")),
    }
    Ok(Value::Map(map))
}

fn insert_pairs(map: &mut IndexMap<String, Value>, s: &str) -> Option<()> {
    let pairs = s
        .split(|c: char| c == '&' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    for pair in pairs {
        let (key, val) = pair.split_once(['=', ':'])?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        insert_grouped(map, key.to_string(), Value::Str(val.trim().to_string()));
    }
    Some(())
}

/// Insert, turning a repeated key into a list of its values.
pub fn insert_grouped(map: &mut IndexMap<String, Value>, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(existing) => {
            let previous = std::mem::replace(existing, Value::List(Vec::new()));
            *existing = previous.concat(value);
        }
        None => {
            map.insert(key, value);
        }
    }
}

/// Apply a scalar conversion to each element of a list conversion.
pub fn list_of(
    value: &Value,
    scalar: impl Fn(&Value) -> Result<Value, ConversionFailure>,
) -> Result<Value, ConversionFailure> {
    let list = to_list(value)?;
    let items = list.into_list();
    items
        .iter()
        .map(&scalar)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

/// Apply a scalar conversion to each value of a map conversion.
pub fn map_of(
    value: &Value,
    scalar: impl Fn(&Value) -> Result<Value, ConversionFailure>,
) -> Result<Value, ConversionFailure> {
    let Value::Map(map) = to_map(value)? else {
        return Err(ConversionFailure::new(value, "map"));
    };
    let mut out = IndexMap::with_capacity(map.len());
    for (key, val) in map {
        let converted = match val {
            Value::List(items) => Value::List(
                items
                    .iter()
                    .map(&scalar)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            other => scalar(&other)?,
        };
        out.insert(key, converted);
    }
    Ok(Value::Map(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_honours_escapes() {
        assert_eq!(split_list(" a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list("a\\,b,c"), vec!["a,b", "c"]);
        assert_eq!(split_list("a,,b"), vec!["a", "b"]);
    }

    #[test]
    fn list_round_trip_through_display() {
        let list = to_list(&Value::from("a, b\\,c ,d")).unwrap();
        assert_eq!(list, Value::from(vec!["a", "b,c", "d"]));
        assert_eq!(to_list(&Value::from(list.to_string())).unwrap(), list);
    }

    #[test]
    fn list_flattens_captured_tokens() {
        let captured = Value::from(vec!["a,b", "c"]);
        assert_eq!(to_list(&captured).unwrap(), Value::from(vec!["a", "b", "c"]));
    }

    #[test]
    fn map_groups_repeated_keys() {
        let map = to_map(&Value::from("a=1 b:2&a=3")).unwrap();
        let map = map.as_map().unwrap();
        assert_eq!(map.get("a"), Some(&Value::from(vec!["1", "3"])));
        assert_eq!(map.get("b"), Some(&Value::from("2")));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn map_is_idempotent() {
        let once = to_map(&Value::from("a=1 b=2")).unwrap();
        assert_eq!(to_map(&once).unwrap(), once);
    }

    #[test]
    fn map_rejects_pairs_without_separator() {
        assert!(to_map(&Value::from("a=1 b")).is_err());
    }

    #[test]
    fn typed_list_and_map() {
        let ints = list_of(&Value::from("1,2,3"), crate::convert::builtin::to_int).unwrap();
        assert_eq!(ints, Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));

        let map = map_of(&Value::from("a=1 a=2 b=3"), crate::convert::builtin::to_int).unwrap();
        let map = map.as_map().unwrap();
        assert_eq!(map.get("a"), Some(&Value::List(vec![Value::Int(1), Value::Int(2)])));
        assert_eq!(map.get("b"), Some(&Value::Int(3)));

        assert!(list_of(&Value::from("1,x"), crate::convert::builtin::to_int).is_err());
    }
}
