//! Instruction text substituted into user messages

use lazy_regex::regex_captures;

use crate::config::FilterConfig;
use crate::persona::{PersonaDefinition, PersonaSet};

const PERSONAS_PER_ROW: usize = 2;
const DEFAULT_INTRO_REQUEST: &str = "Please introduce yourself and explain what you can help me with.";

pub const NO_PERSONAS: &str = "There are currently no specific personas configured.";
pub const RESET_CONFIRMATION: &str = "You have been reset from any specialized persona. Please confirm you are now operating in your default/standard assistant mode.";

fn command(config: &FilterConfig, keyword: &str) -> String {
    format!("`{}{}`", config.keyword_prefix, keyword)
}

fn reset_commands(config: &FilterConfig) -> String {
    config
        .reset_keyword_list()
        .iter()
        .map(|k| command(config, k))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Instruction asking the model to render the persona table.
///
/// Keys are sorted; each row holds two `Command | Name` pairs and a short
/// last row is padded with blank cells.
pub fn persona_table(config: &FilterConfig, personas: &PersonaSet) -> String {
    if personas.is_empty() {
        return NO_PERSONAS.to_string();
    }

    let keys = personas.sorted_keys();
    let rows: Vec<String> = keys
        .chunks(PERSONAS_PER_ROW)
        .map(|chunk| {
            let mut cells = Vec::with_capacity(PERSONAS_PER_ROW * 2);
            for slot in 0..PERSONAS_PER_ROW {
                match chunk.get(slot).and_then(|key| personas.get(key).map(|p| (key, p))) {
                    Some((key, persona)) => {
                        cells.push(command(config, key));
                        cells.push(persona.name.clone());
                    }
                    None => cells.extend([" ".to_string(), " ".to_string()]),
                }
            }
            format!("| {} |", cells.join(" | "))
        })
        .collect();

    let headers = vec!["Command | Name"; PERSONAS_PER_ROW].join(" | ");
    let separators = vec!["---|---"; PERSONAS_PER_ROW].join(" | ");

    format!(
        "Please present the following information. First, a Markdown table of available persona commands, \
         titled '**Available Personas**'. The table should have columns for 'Command' and 'Name', \
         displaying two pairs of these per row.\n\n\
         **Available Personas**\n\
         | {headers} |\n\
         | {separators} |\n\
         {rows}\n\n\
         After the table, please add the following explanation on a new line:\n\
         To revert to the default assistant, use one of these commands: {resets}\n\n\
         Ensure the output is only the Markdown table with its title, followed by the reset instructions, all correctly formatted.",
        headers = headers,
        separators = separators,
        rows = rows.join("\n"),
        resets = reset_commands(config),
    )
}

/// Reset confirmation, optionally followed by what the user asked
pub fn reset_request(remaining: &str) -> String {
    if remaining.trim().is_empty() {
        RESET_CONFIRMATION.to_string()
    } else {
        format!("{} Then, please address the following: {}", RESET_CONFIRMATION, remaining)
    }
}

/// Self-introduction fragment from the persona prompt: the text after
/// "When introducing yourself," up to the next period or the end
pub fn intro_fragment(prompt: &str) -> Option<&str> {
    let (_, fragment) = regex_captures!(r"When introducing yourself,([^.]*)", prompt)?;
    let fragment = fragment.trim();
    (!fragment.is_empty()).then_some(fragment)
}

/// Rewritten user message after a persona switch
pub fn switch_request(persona: &PersonaDefinition, remaining: &str) -> String {
    if remaining.trim().is_empty() {
        match intro_fragment(&persona.prompt) {
            Some(fragment) => format!(
                "Please introduce yourself, {}, and then explain what you can help me with.",
                fragment
            ),
            None => DEFAULT_INTRO_REQUEST.to_string(),
        }
    } else {
        format!(
            "Please briefly introduce yourself as {}. After your introduction, please help with the following: {}",
            persona.name, remaining
        )
    }
}

/// Plain-text overview of personas and commands
pub fn persona_list(config: &FilterConfig, personas: &PersonaSet) -> String {
    let items: Vec<String> = personas
        .sorted_keys()
        .into_iter()
        .filter_map(|key| personas.get(key).map(|p| (key, p)))
        .map(|(key, p)| format!("• {} - {}: {}", command(config, key), p.name, p.description))
        .collect();

    let main_list = if items.is_empty() {
        "No personas configured.".to_string()
    } else {
        items.join("\n")
    };

    format!(
        "Available Personas:\n{}\n\n**Other Commands:**\n\
         • {} - Lists persona commands and names in a multi-column Markdown table, plus reset instructions.\n\
         • {} - Reset to default assistant behavior (LLM will confirm).",
        main_list,
        command(config, &config.list_command_keyword),
        reset_commands(config)
    )
}
