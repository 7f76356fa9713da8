//! Command keyword detection
//!
//! Commands are a keyword preceded by the configured prefix (`!coder`,
//! `!list`, `!reset`) found anywhere in a message. The keyword must be
//! followed by a non-word character or the end of the text, so `!coder2`,
//! `!codereview` and `!c++x` never trigger `!coder` or `!c++`.
//!
//! Detection priority is fixed: the list command, then reset keywords, then
//! persona keys in the order the registry presents them. The first persona
//! key whose matcher hits wins, even when a later key would match more text.

use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

use crate::config::split_keywords;

/// Upper bound on the compiled size of a single matcher
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// The configuration subset matchers are compiled from. Compared as a whole
/// to decide whether recompilation is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternConfig {
    pub prefix: String,
    /// Comma-separated reset keywords
    pub reset_keywords: String,
    pub list_keyword: String,
    pub case_sensitive: bool,
}

/// A detected in-band command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Reset,
    Persona(String),
}

/// Compiled matchers, rebuilt whenever the [`PatternConfig`] fingerprint changes
#[derive(Debug, Default)]
pub struct PatternEngine {
    fingerprint: Option<PatternConfig>,
    list: Option<Regex>,
    reset: Option<Regex>,
    /// Lazily compiled; None marks a matcher that failed to compile
    personas: HashMap<String, Option<Regex>>,
}

impl PatternEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompile matchers if `config` differs from the last compiled one
    pub fn ensure_compiled(&mut self, config: &PatternConfig) {
        if self.fingerprint.as_ref() == Some(config) {
            return;
        }

        log::info!("Compiling patterns for prefix '{}'", config.prefix);

        self.list = compile_keywords(config, &[config.list_keyword.trim().to_string()]);
        self.reset = compile_keywords(config, &split_keywords(&config.reset_keywords));
        self.personas.clear();
        self.fingerprint = Some(config.clone());
    }

    /// Detect the highest-priority command in `text`
    pub fn detect<'a, I>(&mut self, config: &PatternConfig, text: &str, persona_keys: I) -> Option<Command>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if text.is_empty() {
            return None;
        }

        self.ensure_compiled(config);

        if self.list.as_ref().is_some_and(|re| re.is_match(text)) {
            return Some(Command::List);
        }

        if self.reset.as_ref().is_some_and(|re| re.is_match(text)) {
            return Some(Command::Reset);
        }

        for key in persona_keys {
            let matcher = self
                .personas
                .entry(key.to_string())
                .or_insert_with(|| compile_keywords(config, &[key.to_string()]));

            if matcher.as_ref().is_some_and(|re| re.is_match(text)) {
                return Some(Command::Persona(key.to_string()));
            }
        }

        None
    }

    /// Number of persona matchers compiled since the last recompilation
    pub fn compiled_persona_count(&self) -> usize {
        self.personas.len()
    }
}

/// Remove the tokens of `command` (and whitespace following them) from
/// `text`. For reset, every configured reset keyword is removed.
pub fn strip_command(config: &PatternConfig, text: &str, command: &Command) -> String {
    let keywords = match command {
        Command::List => vec![config.list_keyword.trim().to_string()],
        Command::Reset => split_keywords(&config.reset_keywords),
        Command::Persona(key) => vec![key.clone()],
    };

    let mut content = text.to_string();
    for keyword in keywords.iter().filter(|k| !k.is_empty()) {
        let word_end = ends_in_word_char(keyword);
        let pattern = format!(
            "{}{}{}\\s*",
            regex::escape(&config.prefix),
            regex::escape(keyword),
            if word_end { r"\b" } else { "" }
        );
        match build(config, &pattern) {
            Ok(re) => content = remove_matches(&re, &content, !word_end),
            Err(e) => log::error!("Error compiling removal pattern for '{}': {}", keyword, e),
        }
    }

    content.trim().to_string()
}

/// Remove every match of `re` from `text`. With `guarded`, a match that
/// ends directly against a word character is left in place.
fn remove_matches(re: &Regex, text: &str, guarded: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for m in re.find_iter(text) {
        let touches_word = text[m.end()..].chars().next().is_some_and(is_word_char)
            && !m.as_str().ends_with(char::is_whitespace);
        if guarded && touches_word {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        last = m.end();
    }

    out.push_str(&text[last..]);
    out
}

fn build(config: &PatternConfig, pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(!config.case_sensitive)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
}

/// Build one matcher alternating over `keywords`. Blank keywords are
/// skipped; None when nothing remains or compilation fails.
fn compile_keywords(config: &PatternConfig, keywords: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = keywords
        .iter()
        .filter(|k| !k.is_empty())
        .map(|k| format!("{}{}", regex::escape(k), boundary(k)))
        .collect();

    if alternatives.is_empty() {
        return None;
    }

    let pattern = format!("{}(?:{})", regex::escape(&config.prefix), alternatives.join("|"));

    match build(config, &pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::error!("Error compiling pattern for {:?}: {}", keywords, e);
            None
        }
    }
}

/// Terminator requiring a non-word character or end of text after `keyword`
fn boundary(keyword: &str) -> &'static str {
    if ends_in_word_char(keyword) { r"\b" } else { r"(?:\W|$)" }
}

fn ends_in_word_char(keyword: &str) -> bool {
    keyword.chars().last().is_some_and(is_word_char)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
