//! Persona configuration validation
//!
//! Validation is total: it never fails, and reports every problem found
//! rather than stopping at the first.

use serde_json::Value;

const REQUIRED_FIELDS: &[&str] = &["name", "prompt", "description"];

/// Validate a single persona record
pub fn validate_persona(record: &serde_json::Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();

    for field in REQUIRED_FIELDS {
        match record.get(*field) {
            None => errors.push(format!("Missing required field: {}", field)),
            Some(Value::String(s)) if s.trim().is_empty() => {
                errors.push(format!("Field '{}' cannot be empty", field));
            }
            Some(Value::String(_)) => {}
            Some(_) => errors.push(format!("Field '{}' must be a string", field)),
        }
    }

    if let Some(rules) = record.get("rules")
        && !rules.is_array()
    {
        errors.push("Field 'rules' must be a list".to_string());
    }

    errors
}

/// Validate an entire persona source document
pub fn validate(config: &Value) -> Vec<String> {
    let Some(personas) = config.as_object() else {
        return vec!["Personas config must be a dictionary".to_string()];
    };

    if personas.is_empty() {
        return vec!["Personas config cannot be empty".to_string()];
    }

    let mut all_errors = Vec::new();

    for (key, data) in personas {
        if key.trim().is_empty() {
            all_errors.push(format!("Invalid persona key: {}", key));
            continue;
        }

        let Some(record) = data.as_object() else {
            all_errors.push(format!("Persona '{}' must be a dictionary", key));
            continue;
        };

        for error in validate_persona(record) {
            all_errors.push(format!("Persona '{}': {}", key, error));
        }
    }

    all_errors
}
