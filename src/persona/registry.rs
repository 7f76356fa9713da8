//! Persona registry
//!
//! The one place callers ask for "the current personas". Falls back to the
//! built-in defaults when the source is empty and optionally writes them back.

use std::time::Instant;

use super::PersonaSet;
use super::cache::ConfigCache;
use super::defaults::default_personas;
use super::source::{PersonaSource, to_stable_json};

#[derive(Debug, Default)]
pub struct PersonaRegistry {
    cache: ConfigCache,
    persist_defaults: bool,
    debug_performance: bool,
}

impl PersonaRegistry {
    pub fn new(persist_defaults: bool) -> Self {
        Self {
            cache: ConfigCache::new(),
            persist_defaults,
            debug_performance: false,
        }
    }

    pub fn with_debug_performance(mut self, enabled: bool) -> Self {
        self.debug_performance = enabled;
        self
    }

    pub fn set_persist_defaults(&mut self, enabled: bool) {
        self.persist_defaults = enabled;
    }

    pub fn set_debug_performance(&mut self, enabled: bool) {
        self.debug_performance = enabled;
    }

    /// Current personas; never empty under normal operation
    pub fn load(&mut self, source: &dyn PersonaSource) -> PersonaSet {
        let started = Instant::now();

        let mut personas = self.cache.get(source, false);

        // A degraded set carries errors and is passed through, even when
        // nothing in it survived conversion
        if personas.is_empty() && personas.is_valid() {
            log::info!("Using default personas (source empty or missing)");
            personas = default_personas();

            if self.persist_defaults {
                write_defaults(source, &personas);
            }
        }

        if self.debug_performance {
            log::debug!(
                "Persona load completed in {:.2}ms ({} personas)",
                started.elapsed().as_secs_f64() * 1000.0,
                personas.len()
            );
        }

        personas
    }

    /// Write the default personas when the source doesn't exist yet
    pub fn ensure_source_exists(&self, source: &dyn PersonaSource) {
        match source.modified() {
            Ok(Some(_)) => log::debug!("Personas config already exists at: {}", source.identity()),
            Ok(None) => {
                log::info!("Personas config doesn't exist, creating default at: {}", source.identity());
                write_defaults(source, &default_personas());
            }
            Err(e) => log::warn!("Failed to check personas config {}: {:#}", source.identity(), e),
        }
    }

    pub fn is_config_valid(&self, source: &dyn PersonaSource) -> bool {
        self.cache.is_config_valid(&source.identity())
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}

fn write_defaults(source: &dyn PersonaSource, personas: &PersonaSet) {
    let result = to_stable_json(personas).and_then(|json| source.write(&json));
    if let Err(e) = result {
        log::error!("Failed to write default personas to {}: {:#}", source.identity(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::source::testing::MemorySource;

    #[test]
    fn test_empty_source_falls_back_to_defaults() {
        let source = MemorySource::empty("mem");
        let mut registry = PersonaRegistry::new(false);

        let personas = registry.load(&source);

        assert_eq!(personas.len(), 5);
        assert!(personas.contains("coder"));
        assert_eq!(source.write_count(), 0);
    }

    #[test]
    fn test_defaults_are_persisted_and_then_served_from_cache() {
        let source = MemorySource::empty("mem");
        let mut registry = PersonaRegistry::new(true);

        registry.load(&source);
        assert_eq!(source.write_count(), 1);
        assert!(source.contents().unwrap().contains("\"researcher\""));

        let personas = registry.load(&source);
        assert_eq!(personas.len(), 5);
        assert_eq!(source.write_count(), 1);
        assert_eq!(source.read_count(), 1);
        assert!(registry.is_config_valid(&source));
    }

    #[test]
    fn test_configured_personas_replace_defaults() {
        let source = MemorySource::with_contents(
            "mem",
            r#"{"pirate": {"name": "🏴‍☠️ Pirate", "prompt": "Speak like a pirate.", "description": "Arr"}}"#,
        );
        let mut registry = PersonaRegistry::new(true);

        let personas = registry.load(&source);

        assert_eq!(personas.keys().collect::<Vec<_>>(), vec!["pirate"]);
        assert_eq!(source.write_count(), 0);
    }

    #[test]
    fn test_invalid_source_passes_through() {
        let source = MemorySource::with_contents("mem", r#"{"pirate": {"name": "Pirate"}}"#);
        let mut registry = PersonaRegistry::new(true);

        let personas = registry.load(&source);

        assert!(!personas.is_valid());
        assert!(personas.contains("pirate"));
        assert_eq!(source.write_count(), 0);
    }

    #[test]
    fn test_source_without_usable_records_is_kept() {
        let contents = r#"{"pirate": "Speak like a pirate"}"#;
        let source = MemorySource::with_contents("mem", contents);
        let mut registry = PersonaRegistry::new(true);

        let personas = registry.load(&source);

        assert!(personas.is_empty());
        assert!(!personas.is_valid());
        assert_eq!(source.write_count(), 0);
        assert_eq!(source.contents().as_deref(), Some(contents));
    }

    #[test]
    fn test_empty_object_source_gets_defaults() {
        let source = MemorySource::with_contents("mem", "{}");
        let mut registry = PersonaRegistry::new(true);

        assert_eq!(registry.load(&source).len(), 5);
        assert_eq!(source.write_count(), 1);
    }

    #[test]
    fn test_corrupt_source_is_replaced_with_defaults() {
        let source = MemorySource::with_contents("mem", "{{{");
        let mut registry = PersonaRegistry::new(true);

        let personas = registry.load(&source);

        assert_eq!(personas.len(), 5);
        assert_eq!(source.write_count(), 1);
    }

    #[test]
    fn test_ensure_source_exists() {
        let source = MemorySource::empty("mem");
        let registry = PersonaRegistry::new(true);

        registry.ensure_source_exists(&source);
        registry.ensure_source_exists(&source);

        assert_eq!(source.write_count(), 1);
    }
}
