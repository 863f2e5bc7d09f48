#[cfg(test)]
use super::*;
#[cfg(test)]
use crate::KyoError;
#[cfg(test)]
use serde_json::json;

fn sample() -> Value {
    json!({
        "server": {
            "host": "localhost",
            "port": 8080,
            "ratio": 0.5,
            "debug": true,
            "tags": ["a", "b"]
        },
        "empty": null
    })
    .into()
}

#[test]
fn test_typed_access() {
    let doc = sample();

    let host: String = doc.get_as("server.host").expect("Failed to get host");
    let port: u16 = doc.get_as("server.port").expect("Failed to get port");
    let ratio: f64 = doc.get_as("server.ratio").expect("Failed to get ratio");
    let debug: bool = doc.get_as("server.debug").expect("Failed to get debug");
    let tags: Vec<String> = doc.get_as("server.tags").expect("Failed to get tags");

    assert_eq!(host, "localhost");
    assert_eq!(port, 8080);
    assert_eq!(ratio, 0.5);
    assert!(debug);
    assert_eq!(tags, vec!["a", "b"]);
}

#[test]
fn test_missing_path_error() {
    let err = sample().get_as::<String>("server.missing").unwrap_err();
    assert_eq!(
        err,
        KyoError::MissingPath {
            path: "server.missing".into()
        }
    );
}

#[test]
fn test_type_error_names_the_path() {
    let err = sample().get_as::<u16>("server.host").unwrap_err();
    match err {
        KyoError::Type { message, .. } => {
            assert_eq!(message, "Expected number, got string at 'server.host'");
        }
        other => panic!("Expected type error, got {:?}", other),
    }
}

#[test]
fn test_range_checks() {
    assert!(u16::try_from(Value::Number(70000.0)).is_err());
    assert!(u32::try_from(Value::Number(-1.0)).is_err());
    assert!(usize::try_from(Value::Number(1.5)).is_err());
    assert_eq!(i64::try_from(Value::Number(-3.0)).unwrap(), -3);
}

#[test]
fn test_range_edges_do_not_saturate() {
    let two_pow_63 = 2f64.powi(63);
    let err = i64::try_from(Value::Number(two_pow_63)).unwrap_err();
    assert!(err.to_string().contains("out of range for i64"));
    assert_eq!(i64::try_from(Value::Number(-two_pow_63)).unwrap(), i64::MIN);
    assert!(i64::try_from(Value::Number(2.5)).unwrap_err().to_string().contains("not a whole number"));

    assert!(usize::try_from(Value::Number(2f64.powi(64))).is_err());
    assert_eq!(u16::try_from(Value::Number(65535.0)).unwrap(), u16::MAX);
    assert!(u16::try_from(Value::Number(65536.0)).is_err());
}

#[test]
fn test_quoted_booleans_get_a_hint() {
    let err = bool::try_from(Value::String("yes".into())).unwrap_err();
    assert!(err.to_string().contains("Drop the quotes"));
}

#[test]
fn test_optional_and_default_access() {
    let doc = sample();

    assert_eq!(doc.get_optional::<String>("nope").unwrap(), None);
    assert_eq!(doc.get_optional::<Option<String>>("empty").unwrap(), Some(None));
    assert_eq!(doc.get_or("server.timeout", 30u32), 30);
    assert_eq!(doc.get_or("server.port", 1u16), 8080);
}

#[test]
fn test_keys_and_has() {
    let doc = sample();

    let mut keys = doc.get_keys("server").expect("Failed to get keys");
    keys.sort();
    assert_eq!(keys, vec!["debug", "host", "port", "ratio", "tags"]);
    assert!(doc.has("server.tags[1]"));
    assert!(!doc.has("server.tags[2]"));
    assert!(doc.get_keys("server.port").is_err());
}

#[test]
fn test_insert_keeps_first_position() {
    let mut doc = Value::object();
    doc.insert("a", Value::from(1));
    doc.insert("b", Value::from(2));
    let previous = doc.insert("a", Value::from(3));

    assert_eq!(previous, Some(Value::Number(1.0)));
    let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(doc.lookup("a"), Some(&Value::Number(3.0)));
}

#[test]
fn test_display_forms() {
    assert_eq!(Value::Number(987.0).to_string(), "987");
    assert_eq!(Value::Number(0.1).to_string(), "0.1");
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(
        Value::Array(vec![Value::from(1), Value::Null, Value::from("x")]).to_string(),
        "1,,x"
    );
    let obj: Value = vec![("k".to_string(), Value::from("v"))].into_iter().collect();
    assert_eq!(obj.to_string(), r#"{"k":"v"}"#);
}

#[test]
fn test_integral_numbers_serialize_as_integers() {
    let value: Value = vec![
        ("int".to_string(), Value::from(8)),
        ("float".to_string(), Value::from(0.25)),
    ]
    .into_iter()
    .collect();

    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, r#"{"int":8,"float":0.25}"#);
}

#[test]
fn test_pending_interpolation_detection() {
    let mut doc = sample();
    assert!(!doc.has_pending_interpolation());

    doc.insert(
        "later",
        Value::Array(vec![Value::Interpolated(crate::InterpolatedString::new("${a}"))]),
    );
    assert!(doc.has_pending_interpolation());
}
