//! Persona definitions and configuration management
//!
//! A persona bundles a system prompt, a display name and a description.
//! Personas are loaded from a JSON source keyed by persona key:
//!
//! ```json
//! {
//!     "coder": {
//!         "name": "💻 Code Assistant",
//!         "prompt": "You are the 💻 Code Assistant...",
//!         "description": "Expert programming and development assistance.",
//!         "rules": ["1. Prioritize clean code."]
//!     }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

pub mod cache;
pub mod defaults;
pub mod registry;
pub mod source;
pub mod validate;

pub use cache::ConfigCache;
pub use registry::PersonaRegistry;
pub use source::{FileSource, PersonaSource};

/// A single persona, immutable for a given configuration snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaDefinition {
    /// Display name, e.g. "💻 Code Assistant"
    pub name: String,

    /// System prompt injected while the persona is active
    pub prompt: String,

    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<String>,
}

impl PersonaDefinition {
    /// Build a definition from an untrusted JSON record.
    ///
    /// Missing or malformed fields fall back to placeholders derived from
    /// the key, so degraded sources remain usable. Returns None when the
    /// record is not an object.
    pub fn from_value_lenient(key: &str, value: &Value) -> Option<Self> {
        let record = value.as_object()?;

        let text = |field: &str| {
            record
                .get(field)
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };

        let rules = record
            .get("rules")
            .and_then(|v| v.as_array())
            .map(|rules| rules.iter().filter_map(|r| r.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        Some(Self {
            name: text("name").unwrap_or_else(|| title_case(key)),
            prompt: text("prompt").unwrap_or_else(|| format!("You are acting as the {} persona.", key)),
            description: text("description").unwrap_or_else(|| "No description available.".to_string()),
            rules,
        })
    }
}

/// Personas keyed by persona key, in source order.
///
/// Source order drives detection priority; listings sort by key. A set built
/// from an invalid source carries its validation errors and is never cached.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonaSet {
    entries: IndexMap<String, PersonaDefinition>,
    errors: Vec<String>,
}

impl PersonaSet {
    pub fn new(entries: IndexMap<String, PersonaDefinition>) -> Self {
        Self {
            entries,
            errors: Vec::new(),
        }
    }

    /// Convert raw JSON into a set, attaching the given validation errors.
    /// Non-object documents produce an empty set.
    pub fn from_value(value: &Value, errors: Vec<String>) -> Self {
        let entries = value
            .as_object()
            .map(|map| {
                map.iter()
                    .filter(|(key, _)| !key.trim().is_empty())
                    .filter_map(|(key, record)| {
                        PersonaDefinition::from_value_lenient(key, record).map(|def| (key.clone(), def))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { entries, errors }
    }

    pub fn get(&self, key: &str) -> Option<&PersonaDefinition> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Persona keys in source order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Persona keys sorted lexicographically
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PersonaDefinition)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the set came from a source with zero validation errors
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl Serialize for PersonaSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// Capitalize the first letter of every word, lowercasing the rest
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("coder"), "Coder");
        assert_eq!(title_case("data_analyst"), "Data_Analyst");
        assert_eq!(title_case("SQL expert"), "Sql Expert");
    }

    #[test]
    fn test_lenient_fills_placeholders() {
        let def = PersonaDefinition::from_value_lenient("pirate", &json!({"prompt": "Arr."})).unwrap();
        assert_eq!(def.name, "Pirate");
        assert_eq!(def.prompt, "Arr.");
        assert_eq!(def.description, "No description available.");
        assert!(def.rules.is_empty());
    }

    #[test]
    fn test_lenient_keeps_text_verbatim() {
        let def = PersonaDefinition::from_value_lenient(
            "pirate",
            &json!({"name": " Pirate ", "prompt": "Arr.\n", "description": "   "}),
        )
        .unwrap();
        assert_eq!(def.name, " Pirate ");
        assert_eq!(def.prompt, "Arr.\n");
        assert_eq!(def.description, "No description available.");
    }

    #[test]
    fn test_lenient_rejects_non_object() {
        assert!(PersonaDefinition::from_value_lenient("x", &json!("text")).is_none());
    }

    #[test]
    fn test_lenient_keeps_only_string_rules() {
        let def = PersonaDefinition::from_value_lenient(
            "x",
            &json!({"name": "X", "prompt": "p", "description": "d", "rules": ["one", 2, "three"]}),
        )
        .unwrap();
        assert_eq!(def.rules, vec!["one", "three"]);
    }

    #[test]
    fn test_from_value_preserves_source_order() {
        let value: Value = serde_json::from_str(
            r#"{"zeta": {"name": "Z", "prompt": "p", "description": "d"},
                "alpha": {"name": "A", "prompt": "p", "description": "d"}}"#,
        )
        .unwrap();
        let set = PersonaSet::from_value(&value, Vec::new());
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(set.sorted_keys(), vec!["alpha", "zeta"]);
        assert!(set.is_valid());
    }

    #[test]
    fn test_from_value_non_object_is_empty() {
        let set = PersonaSet::from_value(&json!([1, 2, 3]), vec!["bad".to_string()]);
        assert!(set.is_empty());
        assert!(!set.is_valid());
    }

    #[test]
    fn test_serializes_as_plain_mapping() {
        let value = json!({"coder": {"name": "C", "prompt": "p", "description": "d"}});
        let set = PersonaSet::from_value(&value, Vec::new());
        assert_eq!(serde_json::to_value(&set).unwrap(), value);
    }
}
