//! Persona source storage
//!
//! A source is a single JSON blob plus a modification signal. The cache only
//! relies on this contract, so tests can substitute an in-memory source.

use eyre::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Blob store holding the persona configuration
pub trait PersonaSource: Send + Sync {
    /// Stable identity of the source (a path for file sources)
    fn identity(&self) -> String;

    /// Last modification signal, or None when the source does not exist
    fn modified(&self) -> Result<Option<SystemTime>>;

    /// Raw contents of the source
    fn read(&self) -> Result<String>;

    /// Replace the contents of the source
    fn write(&self, contents: &str) -> Result<()>;
}

/// Persona source backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersonaSource for FileSource {
    fn identity(&self) -> String {
        self.path.display().to_string()
    }

    fn modified(&self) -> Result<Option<SystemTime>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let metadata = fs::metadata(&self.path)
            .with_context(|| format!("Failed to stat persona file: {}", self.path.display()))?;
        let modified = metadata
            .modified()
            .with_context(|| format!("No modification time for: {}", self.path.display()))?;
        Ok(Some(modified))
    }

    fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).with_context(|| format!("Failed to read persona file: {}", self.path.display()))
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create persona directory: {}", parent.display()))?;
        }
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write persona file: {}", self.path.display()))?;
        log::info!("Wrote personas config to: {}", self.path.display());
        Ok(())
    }
}

/// Serialize with 4-space indentation and unescaped unicode
pub fn to_stable_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize personas config")?;
    let mut json = String::from_utf8(buf).context("Serialized personas config is not UTF-8")?;
    json.push('\n');
    Ok(json)
}
