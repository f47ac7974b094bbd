//! Wire-case mapping: column names are snake_case, API keys are camelCase.

use serde_json::{Map, Value};

/// "user_id" -> "userId"
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// "userId" -> "user_id"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert all object keys to camelCase, recursing into nested objects and arrays.
/// Applied to every outgoing payload.
pub fn value_keys_to_camel_case(value: &mut Value) {
    match value {
        Value::Object(map) => {
            rename_keys(map, to_camel_case);
            for (_, v) in map.iter_mut() {
                value_keys_to_camel_case(v);
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                value_keys_to_camel_case(v);
            }
        }
        _ => {}
    }
}

/// Convert top-level object keys to snake_case. Applied to request bodies and
/// query parameters before they reach validation and the store.
pub fn object_keys_to_snake_case(map: &mut Map<String, Value>) {
    rename_keys(map, to_snake_case);
}

fn rename_keys(map: &mut Map<String, Value>, f: fn(&str) -> String) {
    let keys: Vec<String> = map.keys().cloned().collect();
    for k in keys {
        let renamed = f(&k);
        if renamed != k {
            if let Some(v) = map.remove(&k) {
                map.insert(renamed, v);
            }
        }
    }
}
