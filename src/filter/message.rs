//! Chat messages as exchanged with the host

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::persona::{PersonaDefinition, PersonaSet};

/// Marker identifying system messages injected for a persona
pub const PERSONA_MARKER: &str = "🎭 **Active Persona**";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the conversation. Fields the filter doesn't know about are
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            extra: Map::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

#[cfg(test)]
impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Builds and recognizes persona system messages
#[derive(Debug, Clone, Copy)]
pub struct PersonaMessages {
    pub show_info: bool,
}

impl PersonaMessages {
    /// System message carrying the persona prompt, plus the marker line when
    /// persona info is shown
    pub fn create(&self, persona: &PersonaDefinition) -> Message {
        let mut content = persona.prompt.clone();
        if self.show_info {
            content.push_str(&format!("\n\n{}: {}", PERSONA_MARKER, persona.name));
        }
        Message::system(content)
    }

    /// True for system messages injected for any persona. Without the marker
    /// line a persona message is recognized by its exact prompt text.
    pub fn is_persona_message(&self, message: &Message, personas: &PersonaSet) -> bool {
        if message.role != Role::System {
            return false;
        }
        message.content.contains(PERSONA_MARKER) || personas.iter().any(|(_, p)| message.content == p.prompt)
    }

    /// True when `message` is the system message for `persona`
    pub fn is_message_for(&self, message: &Message, persona: &PersonaDefinition) -> bool {
        if message.role != Role::System {
            return false;
        }
        if self.show_info {
            message.content.contains(&format!("{}: {}", PERSONA_MARKER, persona.name))
        } else {
            message.content == persona.prompt
        }
    }
}

/// Index and content of the last user message
pub fn find_last_user_message(messages: &[Message]) -> Option<(usize, String)> {
    messages
        .iter()
        .enumerate()
        .rev()
        .find(|(_, m)| m.role == Role::User)
        .map(|(i, m)| (i, m.content.clone()))
}
