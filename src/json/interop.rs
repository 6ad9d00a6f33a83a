//! Purpose: Bridge `Value` with the serde ecosystem.
//! Exports: `Serialize` for `Value`, conversions to and from `serde_json::Value`.
//! Role: Lets typed configs decode through serde after parsing with this crate.
//! Invariants: Conversions preserve variant tags and object members.
//! Notes: Non-finite numbers have no serde_json representation and become `null`.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::json::value::Value;

// Largest magnitude where every integer is exactly representable as f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Integral numbers cross into serde as integers so typed fields like `u32` decode.
fn as_integer(num: f64) -> Option<i64> {
    let integral = num.fract() == 0.0 && num.abs() <= MAX_SAFE_INTEGER;
    let negative_zero = num == 0.0 && num.is_sign_negative();
    (integral && !negative_zero).then_some(num as i64)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(text) => serializer.serialize_str(text),
            Value::Number(num) => match as_integer(*num) {
                Some(int) => serializer.serialize_i64(int),
                None => serializer.serialize_f64(*num),
            },
            Value::Boolean(flag) => serializer.serialize_bool(*flag),
            Value::Null => serializer.serialize_unit(),
            Value::Object(map) => {
                let mut state = serializer.serialize_map(Some(map.len()))?;
                for (key, item) in map {
                    state.serialize_entry(key, item)?;
                }
                state.end()
            }
            Value::Array(items) => {
                let mut state = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    state.serialize_element(item)?;
                }
                state.end()
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(text) => serde_json::Value::String(text.clone()),
            Value::Number(num) => match as_integer(*num) {
                Some(int) => serde_json::Value::from(int),
                None => serde_json::Number::from_f64(*num)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            },
            Value::Boolean(flag) => serde_json::Value::Bool(*flag),
            Value::Null => serde_json::Value::Null,
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), serde_json::Value::from(item)))
                    .collect(),
            ),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Boolean(*flag),
            serde_json::Value::Number(num) => {
                num.as_f64().map(Value::Number).unwrap_or(Value::Null)
            }
            serde_json::Value::String(text) => Value::String(text.clone()),
            serde_json::Value::Array(items) => items.iter().map(Value::from).collect(),
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(key, item)| (key.clone(), Value::from(item)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::json::parse::parse;
    use crate::json::value::Value;
    use serde_json::json;

    #[test]
    fn converts_to_serde_json() {
        let value = parse(r#"{"a":[1,"two",null,true],"b":{"c":2.5}}"#).unwrap();
        let converted = serde_json::Value::from(&value);
        assert_eq!(converted, json!({"a": [1, "two", null, true], "b": {"c": 2.5}}));
    }

    #[test]
    fn converts_from_serde_json() {
        let source = json!({"n": 10, "s": "x", "arr": [false, null]});
        let value = Value::from(&source);
        let expected = Value::object()
            .with("n", 10)
            .with("s", "x")
            .with("arr", Value::from(vec![Value::from(false), Value::Null]));
        assert_eq!(value, expected);
    }

    #[test]
    fn serialize_impl_matches_structure() {
        let value = Value::object().with("k", Value::from(vec![Value::from(1), Value::Null]));
        let encoded = serde_json::to_value(&value).unwrap();
        assert_eq!(encoded, json!({"k": [1, null]}));
    }

    #[test]
    fn fractional_and_negative_zero_stay_floats() {
        assert_eq!(serde_json::Value::from(&Value::from(2.5)), json!(2.5));
        let neg_zero = serde_json::Value::from(&Value::from(-0.0));
        assert_eq!(neg_zero.as_f64().map(f64::is_sign_negative), Some(true));
        assert!(neg_zero.is_f64());
    }

    #[test]
    fn non_finite_numbers_become_null() {
        let converted = serde_json::Value::from(&Value::from(f64::INFINITY));
        assert_eq!(converted, serde_json::Value::Null);
    }
}
