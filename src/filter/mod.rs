//! Persona switching filter
//!
//! The host calls [`Filter::inlet`] once per inbound request with the
//! conversation so far. The filter looks for a command in the latest user
//! message and rewrites the message list:
//!
//! - `!list` replaces the message with a persona table request
//! - `!reset` (or another reset keyword) drops the active persona
//! - `!<key>` activates a persona and injects its system prompt
//! - no command re-applies the active persona when persistence is enabled
//!
//! [`Filter::outlet`] is called for outbound responses and passes them through.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::FilterConfig;
use crate::notify::{NotificationScheduler, StatusEmitter, StatusKind};
use crate::pattern::{Command, PatternEngine, strip_command};
use crate::persona::{FileSource, PersonaRegistry, PersonaSet, PersonaSource};

pub mod message;
pub mod prompts;

pub use message::{Message, PersonaMessages, Role};

use message::find_last_user_message;

const STATUS_OFF: &str = "ℹ️ Persona Switcher is OFF. Assistant reverted to default.";
const STATUS_LIST: &str = "📋 Preparing persona list table and reset info...";
const STATUS_RESET: &str = "🔄 Reset to default. LLM will confirm.";

/// Logical state derived from the toggle and the active persona
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonaState {
    Off,
    Idle,
    Active(String),
}

/// State carried across requests for one filter attachment
#[derive(Debug, Clone)]
pub struct FilterState {
    pub current_persona: Option<String>,
    pub toggle: bool,
    pub was_toggled_off_last_call: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            current_persona: None,
            toggle: true,
            was_toggled_off_last_call: false,
        }
    }
}

pub struct Filter {
    config: FilterConfig,
    state: FilterState,
    source: Box<dyn PersonaSource>,
    registry: PersonaRegistry,
    patterns: PatternEngine,
    notifier: NotificationScheduler,
}

impl Filter {
    /// Attach a filter reading personas from the configured file
    pub fn new(config: FilterConfig) -> Self {
        let source = FileSource::new(config.persona_source_path());
        Self::with_source(config, Box::new(source))
    }

    /// Attach a filter reading personas from `source`
    pub fn with_source(config: FilterConfig, source: Box<dyn PersonaSource>) -> Self {
        let registry =
            PersonaRegistry::new(config.create_default_config).with_debug_performance(config.debug_performance);
        let notifier = NotificationScheduler::new(
            config.show_persona_info,
            Duration::from_millis(config.status_message_auto_close_delay_ms),
        );

        if config.create_default_config {
            registry.ensure_source_exists(source.as_ref());
        }

        Self {
            config,
            state: FilterState::default(),
            source,
            registry,
            patterns: PatternEngine::new(),
            notifier,
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Apply new host settings. Switches to a new persona file when the
    /// source location changed; patterns recompile on next detection.
    pub fn update_config(&mut self, config: FilterConfig) {
        if config.persona_source_path() != self.config.persona_source_path() {
            self.source = Box::new(FileSource::new(config.persona_source_path()));
            self.registry.invalidate();
            log::info!("Persona source changed to: {}", self.source.identity());

            if config.create_default_config {
                self.registry.ensure_source_exists(self.source.as_ref());
            }
        }

        self.registry.set_persist_defaults(config.create_default_config);
        self.registry.set_debug_performance(config.debug_performance);
        self.notifier.configure(
            config.show_persona_info,
            Duration::from_millis(config.status_message_auto_close_delay_ms),
        );
        self.config = config;
    }

    pub fn set_toggle(&mut self, enabled: bool) {
        self.state.toggle = enabled;
    }

    pub fn current_persona(&self) -> Option<&str> {
        self.state.current_persona.as_deref()
    }

    pub fn persona_state(&self) -> PersonaState {
        match (self.state.toggle, &self.state.current_persona) {
            (false, _) => PersonaState::Off,
            (true, None) => PersonaState::Idle,
            (true, Some(key)) => PersonaState::Active(key.clone()),
        }
    }

    /// Current personas (defaults when the source is empty)
    pub fn personas(&mut self) -> PersonaSet {
        self.registry.load(self.source.as_ref())
    }

    /// Whether the current source has been loaded and passed validation
    pub fn is_config_valid(&self) -> bool {
        self.registry.is_config_valid(self.source.as_ref())
    }

    pub fn notifier(&self) -> &NotificationScheduler {
        &self.notifier
    }

    fn persona_messages(&self) -> PersonaMessages {
        PersonaMessages {
            show_info: self.config.show_persona_info,
        }
    }

    /// Rewrite `messages` for an inbound request
    pub async fn inlet(&mut self, messages: &mut Vec<Message>, emitter: Option<&Arc<dyn StatusEmitter>>) {
        if !self.state.toggle {
            self.handle_toggle_off(messages, emitter).await;
            return;
        }

        if self.state.was_toggled_off_last_call {
            self.state.was_toggled_off_last_call = false;
        }

        if messages.is_empty() {
            return;
        }

        let personas = self.personas();

        let Some((index, original)) = find_last_user_message(messages) else {
            self.apply_persistent_persona(messages, &personas);
            return;
        };

        match self.detect(&original, &personas) {
            Some(Command::List) => self.handle_list(messages, index, &personas, emitter).await,
            Some(Command::Reset) => self.handle_reset(messages, &original, &personas, emitter).await,
            Some(Command::Persona(key)) => {
                self.handle_switch(messages, &key, &original, &personas, emitter)
                    .await
            }
            None => self.apply_persistent_persona(messages, &personas),
        }
    }

    /// Responses pass through unchanged
    pub async fn outlet(&mut self, messages: &mut [Message]) {
        log::trace!("Outlet passthrough ({} messages)", messages.len());
    }

    fn detect(&mut self, text: &str, personas: &PersonaSet) -> Option<Command> {
        let started = Instant::now();
        let command = self
            .patterns
            .detect(&self.config.pattern_config(), text, personas.keys());

        if self.config.debug_performance {
            log::debug!(
                "Keyword detection completed in {:.2}ms (result: {:?})",
                started.elapsed().as_secs_f64() * 1000.0,
                command
            );
        }
        command
    }

    async fn handle_toggle_off(&mut self, messages: &mut Vec<Message>, emitter: Option<&Arc<dyn StatusEmitter>>) {
        if self.state.current_persona.is_some() || !self.state.was_toggled_off_last_call {
            let was_active = self.state.current_persona.take().is_some();

            if !messages.is_empty() {
                let personas = self.personas();
                let builder = self.persona_messages();
                messages.retain(|m| !builder.is_persona_message(m, &personas));
            }

            if was_active {
                log::info!("Filter switched off, persona cleared");
                self.notifier.notify(emitter, STATUS_OFF, StatusKind::Complete).await;
            }
        }
        self.state.was_toggled_off_last_call = true;
    }

    async fn handle_list(
        &mut self,
        messages: &mut [Message],
        index: usize,
        personas: &PersonaSet,
        emitter: Option<&Arc<dyn StatusEmitter>>,
    ) {
        messages[index].content = prompts::persona_table(&self.config, personas);
        log::info!("Listing {} personas", personas.len());
        self.notifier.notify(emitter, STATUS_LIST, StatusKind::Complete).await;
    }

    async fn handle_reset(
        &mut self,
        messages: &mut Vec<Message>,
        original: &str,
        personas: &PersonaSet,
        emitter: Option<&Arc<dyn StatusEmitter>>,
    ) {
        self.state.current_persona = None;

        let builder = self.persona_messages();
        messages.retain(|m| !builder.is_persona_message(m, personas));

        let remaining = strip_command(&self.config.pattern_config(), original, &Command::Reset);
        rewrite_first_matching(messages, original, prompts::reset_request(&remaining));

        log::info!("Persona reset to default");
        self.notifier.notify(emitter, STATUS_RESET, StatusKind::Complete).await;
    }

    async fn handle_switch(
        &mut self,
        messages: &mut Vec<Message>,
        key: &str,
        original: &str,
        personas: &PersonaSet,
        emitter: Option<&Arc<dyn StatusEmitter>>,
    ) {
        let Some(persona) = personas.get(key) else {
            return;
        };

        self.state.current_persona = Some(key.to_string());

        let builder = self.persona_messages();
        messages.retain(|m| !builder.is_persona_message(m, personas));

        let command = Command::Persona(key.to_string());
        let remaining = strip_command(&self.config.pattern_config(), original, &command);
        rewrite_first_matching(messages, original, prompts::switch_request(persona, &remaining));

        messages.insert(0, builder.create(persona));

        log::info!("Switched to persona '{}'", key);
        self.notifier
            .notify(emitter, &format!("🎭 Switched to {}", persona.name), StatusKind::Complete)
            .await;
    }

    /// Keep exactly one system message for the active persona
    fn apply_persistent_persona(&mut self, messages: &mut Vec<Message>, personas: &PersonaSet) {
        if !self.config.persistent_persona {
            return;
        }
        let Some(key) = self.state.current_persona.as_deref() else {
            return;
        };
        let Some(persona) = personas.get(key) else {
            log::debug!("Active persona '{}' no longer configured, not re-applying", key);
            return;
        };

        let builder = self.persona_messages();
        let mut found = false;
        messages.retain(|m| {
            if !builder.is_persona_message(m, personas) {
                return true;
            }
            if !found && builder.is_message_for(m, persona) {
                found = true;
                return true;
            }
            false
        });

        if !found {
            messages.insert(0, builder.create(persona));
        }
    }
}

/// Rewrite the first user message whose content equals `original`.
///
/// Messages are identified by text only, so of several identical user
/// messages only the first one is rewritten.
fn rewrite_first_matching(messages: &mut [Message], original: &str, content: String) {
    if let Some(message) = messages
        .iter_mut()
        .find(|m| m.role == Role::User && m.content == original)
    {
        message.content = content;
    }
}
