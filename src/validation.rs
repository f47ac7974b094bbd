//! Request validation driven by the entity schema descriptions.
//!
//! Unlike a first-failure check, create validation walks every writable column
//! and reports the complete violation list in one response.

use crate::case::to_camel_case;
use crate::entity::{ColumnDef, Format, TableSchema};
use crate::error::{HttpError, Violation};
use regex::Regex;
use serde_json::{Map, Value};

/// Validate a create body. Every required writable column must be present and
/// non-empty; present values must satisfy their column rules.
pub fn validate_create(schema: &TableSchema, body: &Map<String, Value>) -> Result<(), HttpError> {
    let mut violations = Vec::new();
    for col in schema.writable() {
        let val = body.get(col.name);
        if col.required && is_empty(val) {
            violations.push(Violation::new(
                to_camel_case(col.name),
                format!("{} should not be empty", to_camel_case(col.name)),
            ));
            continue;
        }
        if let Some(v) = val {
            check_column(col, v, &mut violations);
        }
    }
    finish(violations)
}

/// Validate an update body: only the fields present are checked. A required
/// column may be omitted, but not blanked out.
pub fn validate_update(schema: &TableSchema, body: &Map<String, Value>) -> Result<(), HttpError> {
    let mut violations = Vec::new();
    for (key, v) in body {
        let Some(col) = schema.column(key) else { continue };
        if col.generated {
            continue;
        }
        if col.required && is_empty(Some(v)) {
            violations.push(Violation::new(
                to_camel_case(col.name),
                format!("{} should not be empty", to_camel_case(col.name)),
            ));
            continue;
        }
        check_column(col, v, &mut violations);
    }
    finish(violations)
}

fn finish(violations: Vec<Violation>) -> Result<(), HttpError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(HttpError::input_error(violations))
    }
}

fn is_empty(val: Option<&Value>) -> bool {
    match val {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn check_column(col: &ColumnDef, v: &Value, violations: &mut Vec<Violation>) {
    if v.is_null() {
        return;
    }
    let field = to_camel_case(col.name);
    if let Some(format) = col.format {
        check_format(&field, v, format, violations);
    }
    if let Some(s) = v.as_str() {
        if let Some(min) = col.min_length {
            if s.chars().count() < min as usize {
                violations.push(Violation::new(
                    field.clone(),
                    format!("{} must be at least {} characters", field, min),
                ));
            }
        }
        if let Some(max) = col.max_length {
            if s.chars().count() > max as usize {
                violations.push(Violation::new(
                    field.clone(),
                    format!("{} must be at most {} characters", field, max),
                ));
            }
        }
        if let Some(pattern) = col.pattern {
            // Patterns come from the schema definitions, so compilation cannot fail.
            if let Ok(re) = Regex::new(pattern) {
                if !re.is_match(s) {
                    violations.push(Violation::new(
                        field.clone(),
                        format!("{} does not match the required pattern", field),
                    ));
                }
            }
        }
    }
}

fn check_format(field: &str, v: &Value, format: Format, violations: &mut Vec<Violation>) {
    match format {
        Format::Email => {
            if let Some(s) = v.as_str() {
                if !s.contains('@') || s.len() < 3 {
                    violations.push(Violation::new(
                        field.to_string(),
                        format!("{} must be a valid email", field),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SchemaSet;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn create_collects_every_missing_required_field() {
        let schema = SchemaSet::new().posts;
        let err = validate_create(&schema, &body(json!({}))).unwrap_err();
        let HttpError::Validation { violations, .. } = err else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["body", "userId"]);
        assert!(violations[0].message.contains("body should not be empty"));
        assert!(violations[1].message.contains("userId should not be empty"));
    }

    #[test]
    fn create_accepts_a_valid_post_body() {
        let schema = SchemaSet::new().posts;
        assert!(validate_create(&schema, &body(json!({ "body": "hi", "user_id": 1 }))).is_ok());
    }

    #[test]
    fn blank_string_counts_as_empty() {
        let schema = SchemaSet::new().posts;
        let err = validate_create(&schema, &body(json!({ "body": "  ", "user_id": 1 })));
        assert!(err.is_err());
    }

    #[test]
    fn user_rules_report_format_length_and_pattern() {
        let schema = SchemaSet::new().users;
        let err = validate_create(
            &schema,
            &body(json!({ "username": "a b", "email": "nope", "password": "short" })),
        )
        .unwrap_err();
        let HttpError::Validation { violations, .. } = err else {
            panic!("expected validation error");
        };
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("pattern")));
        assert!(messages.iter().any(|m| m.contains("valid email")));
        assert!(messages.iter().any(|m| m.contains("at least 8 characters")));
    }

    #[test]
    fn update_checks_only_present_fields() {
        let schema = SchemaSet::new().posts;
        assert!(validate_update(&schema, &body(json!({ "body": "edited" }))).is_ok());
        // omitting required fields is fine on update
        assert!(validate_update(&schema, &body(json!({}))).is_ok());
        // blanking a required field is not
        assert!(validate_update(&schema, &body(json!({ "body": "" }))).is_err());
    }
}
