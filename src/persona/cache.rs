//! Persona configuration cache
//!
//! Reloads the persona source only when it is forced, the source identity
//! changes, the source reports a newer modification signal, or nothing is
//! cached yet. Only sets that pass validation are ever cached.

use std::collections::HashSet;
use std::time::SystemTime;

use super::PersonaSet;
use super::source::PersonaSource;
use super::validate::validate;

/// How many validation errors to log before summarizing
const MAX_LOGGED_ERRORS: usize = 5;

#[derive(Debug, Default)]
pub struct ConfigCache {
    cached: PersonaSet,
    source_identity: Option<String>,
    last_modified: Option<SystemTime>,
    validated_sources: HashSet<String>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get personas from `source`, reloading only when needed.
    ///
    /// Never fails: an absent, unreadable or unparsable source yields an
    /// empty set, and an invalid source yields its raw data as a degraded set
    /// without touching the cache.
    pub fn get(&mut self, source: &dyn PersonaSource, force: bool) -> PersonaSet {
        let identity = source.identity();

        let modified = match source.modified() {
            Ok(Some(modified)) => modified,
            Ok(None) => {
                log::debug!("Persona source doesn't exist: {}", identity);
                return PersonaSet::default();
            }
            Err(e) => {
                log::warn!("Failed to check persona source {}: {:#}", identity, e);
                return PersonaSet::default();
            }
        };

        let identity_changed = self.source_identity.as_deref() != Some(identity.as_str());
        let source_modified = self.last_modified.is_none_or(|last| modified > last);
        let cache_empty = self.cached.is_empty();

        if !(force || identity_changed || source_modified || cache_empty) {
            log::debug!("Using cached personas ({} personas)", self.cached.len());
            return self.cached.clone();
        }

        log::info!(
            "Reloading personas from {} (force: {}, path changed: {}, modified: {}, empty cache: {})",
            identity,
            force,
            identity_changed,
            source_modified,
            cache_empty
        );

        let raw = match source.read() {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Error loading personas from {}: {:#}", identity, e);
                return PersonaSet::default();
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("JSON decode error in {}: {}", identity, e);
                return PersonaSet::default();
            }
        };

        if value.as_object().is_some_and(|fields| fields.is_empty()) {
            log::info!("Persona source {} has no personas", identity);
            return PersonaSet::default();
        }

        let errors = validate(&value);
        if !errors.is_empty() {
            log::warn!("Validation errors found in {}:", identity);
            for error in errors.iter().take(MAX_LOGGED_ERRORS) {
                log::warn!("  - {}", error);
            }
            if errors.len() > MAX_LOGGED_ERRORS {
                log::warn!("  ... and {} more errors", errors.len() - MAX_LOGGED_ERRORS);
            }
            return PersonaSet::from_value(&value, errors);
        }

        let personas = PersonaSet::from_value(&value, Vec::new());
        log::info!("Cached {} personas from {}", personas.len(), identity);

        self.cached = personas;
        self.last_modified = Some(modified);
        self.validated_sources.insert(identity.clone());
        self.source_identity = Some(identity);

        self.cached.clone()
    }

    /// Whether a source has been loaded and validated successfully
    pub fn is_config_valid(&self, identity: &str) -> bool {
        self.validated_sources.contains(identity)
    }

    /// Force a reload on next access
    pub fn invalidate(&mut self) {
        self.cached = PersonaSet::default();
        self.validated_sources.clear();
        self.last_modified = None;
        self.source_identity = None;
        log::info!("Persona cache invalidated");
    }
}
