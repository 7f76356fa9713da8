//! Inbound filtering over JSON lines
//!
//! Each stdin line is one request body `{"messages": [...], ...}`. The
//! rewritten body is written to stdout as one line; status events go to
//! stderr as JSON lines. A body may carry `"toggle": false` to switch the
//! filter off for that request, and a `"settings"` object overriding filter
//! settings from that request on. A line that isn't a request body is
//! logged and echoed unchanged.

use async_trait::async_trait;
use eyre::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::config::{Config, FilterConfig};
use crate::filter::{Filter, Message};
use crate::notify::{StatusEmitter, StatusEvent};

/// A request body as sent by the host. Unknown fields are passed through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggle: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Message>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Message>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Writes status events to stderr, one JSON object per line
pub struct StderrEmitter;

#[async_trait]
impl StatusEmitter for StderrEmitter {
    async fn emit(&self, event: StatusEvent) -> Result<()> {
        let line = serde_json::to_string(&event).context("Failed to serialize status event")?;
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{}", line).context("Failed to write status event")?;
        Ok(())
    }
}

pub fn run(off: bool, no_wait: bool, config: &Config) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let emitter: Arc<dyn StatusEmitter> = Arc::new(StderrEmitter);

    rt.block_on(async {
        let mut filter = Filter::new(config.filter.clone());
        let count = process(io::stdin().lock(), io::stdout().lock(), &mut filter, &emitter, !off).await?;
        log::info!(
            "Filtered {} request bodies (active persona: {})",
            count,
            filter.current_persona().unwrap_or("none")
        );

        if !no_wait {
            filter.notifier().drain().await;
        }
        Ok(())
    })
}

/// Filter every body read from `reader` into `writer`. Returns the number
/// of bodies processed.
pub async fn process<R, W>(
    reader: R,
    mut writer: W,
    filter: &mut Filter,
    emitter: &Arc<dyn StatusEmitter>,
    default_toggle: bool,
) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut count = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read request body from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let mut body: RequestBody = match serde_json::from_str(&line) {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Passing through unparsable request body on line {}: {}", index + 1, e);
                writeln!(writer, "{}", line)?;
                writer.flush()?;
                count += 1;
                continue;
            }
        };

        if let Some(settings) = body.settings.take() {
            match apply_settings(filter.config(), settings) {
                Ok(updated) => filter.update_config(updated),
                Err(e) => log::warn!("Ignoring invalid settings on line {}: {:#}", index + 1, e),
            }
        }

        filter.set_toggle(body.toggle.unwrap_or(default_toggle));
        filter.inlet(&mut body.messages, Some(emitter)).await;
        log::debug!("Line {}: persona state {:?}", index + 1, filter.persona_state());

        serde_json::to_writer(&mut writer, &body).context("Failed to serialize request body")?;
        writeln!(writer)?;
        writer.flush()?;
        count += 1;
    }

    Ok(count)
}

/// `current` with the fields present in `settings` replaced
fn apply_settings(current: &FilterConfig, settings: Map<String, Value>) -> Result<FilterConfig> {
    let mut merged = serde_json::to_value(current).context("Failed to serialize filter settings")?;
    if let Some(fields) = merged.as_object_mut() {
        fields.extend(settings);
    }
    serde_json::from_value(merged).context("Failed to parse filter settings")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingEmitter;
    use crate::persona::source::testing::MemorySource;
    use std::io::Cursor;

    fn filter() -> Filter {
        Filter::with_source(FilterConfig::default(), Box::new(MemorySource::empty("mem")))
    }

    fn output_bodies(output: Vec<u8>) -> Vec<Value> {
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_rewrites_and_preserves_extra_fields() {
        let recorder = Arc::new(RecordingEmitter::default());
        let emitter: Arc<dyn StatusEmitter> = recorder.clone();
        let input = concat!(
            r#"{"model": "m1", "messages": [{"role": "user", "content": "!coder sort", "id": 7}]}"#,
            "\n\n",
            r#"{"model": "m1", "messages": [{"role": "user", "content": "thanks"}]}"#,
            "\n"
        );
        let mut output = Vec::new();
        let mut filter = filter();

        let count = process(Cursor::new(input), &mut output, &mut filter, &emitter, true)
            .await
            .unwrap();

        assert_eq!(count, 2);
        let bodies = output_bodies(output);
        assert_eq!(bodies[0]["model"], "m1");
        assert_eq!(bodies[0]["messages"][0]["role"], "system");
        assert_eq!(bodies[0]["messages"][1]["id"], 7);
        assert_eq!(bodies[1]["messages"][0]["role"], "system");
        assert_eq!(bodies[1]["messages"][1]["content"], "thanks");
        assert!(bodies[0].get("toggle").is_none());

        filter.notifier().drain().await;
        assert_eq!(recorder.descriptions(), vec!["🎭 Switched to 💻 Code Assistant"]);
    }

    #[tokio::test]
    async fn test_body_toggle_overrides_default() {
        let emitter: Arc<dyn StatusEmitter> = Arc::new(RecordingEmitter::default());
        let input = r#"{"toggle": false, "messages": [{"role": "user", "content": "!coder sort"}]}"#;
        let mut output = Vec::new();
        let mut filter = filter();

        process(Cursor::new(input), &mut output, &mut filter, &emitter, true)
            .await
            .unwrap();

        let bodies = output_bodies(output);
        assert_eq!(bodies[0]["messages"].as_array().unwrap().len(), 1);
        assert_eq!(bodies[0]["toggle"], false);
        assert_eq!(filter.current_persona(), None);
    }

    #[tokio::test]
    async fn test_settings_apply_from_that_request_on() {
        let emitter: Arc<dyn StatusEmitter> = Arc::new(RecordingEmitter::default());
        let input = concat!(
            r#"{"settings": {"keyword_prefix": "@"}, "messages": [{"role": "user", "content": "!coder hi"}]}"#,
            "\n",
            r#"{"messages": [{"role": "user", "content": "@writer hi"}]}"#,
            "\n"
        );
        let mut output = Vec::new();
        let mut filter = filter();

        process(Cursor::new(input), &mut output, &mut filter, &emitter, true)
            .await
            .unwrap();

        let bodies = output_bodies(output);
        assert!(bodies[0].get("settings").is_none());
        assert_eq!(bodies[0]["messages"].as_array().unwrap().len(), 1);
        assert_eq!(filter.config().keyword_prefix, "@");
        assert_eq!(filter.current_persona(), Some("writer"));
    }

    #[test]
    fn test_apply_settings_rejects_wrong_types() {
        let mut settings = Map::new();
        settings.insert("persistent_persona".to_string(), Value::from("sometimes"));
        assert!(apply_settings(&FilterConfig::default(), settings).is_err());
    }

    #[tokio::test]
    async fn test_null_messages_and_bad_lines_keep_the_stream_going() {
        let emitter: Arc<dyn StatusEmitter> = Arc::new(RecordingEmitter::default());
        let input = concat!(
            r#"{"messages": [{"role": "user", "content": "!coder"}]}"#,
            "\n",
            r#"{"messages": null}"#,
            "\n",
            "not json\n",
            r#"{"messages": [{"role": "user", "content": "hi"}]}"#,
            "\n"
        );
        let mut output = Vec::new();
        let mut filter = filter();

        let count = process(Cursor::new(input), &mut output, &mut filter, &emitter, true)
            .await
            .unwrap();

        assert_eq!(count, 4);
        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);

        let null_body: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(null_body["messages"], serde_json::json!([]));

        assert_eq!(lines[2], "not json");

        let last: Value = serde_json::from_str(lines[3]).unwrap();
        assert_eq!(last["messages"][0]["role"], "system");
        assert_eq!(filter.current_persona(), Some("coder"));
    }

    #[tokio::test]
    async fn test_invalid_settings_are_ignored() {
        let emitter: Arc<dyn StatusEmitter> = Arc::new(RecordingEmitter::default());
        let input = r#"{"settings": {"case_sensitive": "maybe"}, "messages": [{"role": "user", "content": "!coder"}]}"#;
        let mut output = Vec::new();
        let mut filter = filter();

        process(Cursor::new(input), &mut output, &mut filter, &emitter, true)
            .await
            .unwrap();

        assert!(!filter.config().case_sensitive);
        assert_eq!(filter.current_persona(), Some("coder"));
    }
}
