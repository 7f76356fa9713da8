use eyre::{Context, Result};
use std::io::{self, BufRead, Write};

use super::inlet::RequestBody;
use crate::config::Config;
use crate::filter::Filter;

pub fn run(config: &Config) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let mut filter = Filter::new(config.filter.clone());

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();

    rt.block_on(async {
        for line in stdin.lines() {
            let line = line.context("Failed to read response body from stdin")?;
            if line.trim().is_empty() {
                continue;
            }

            let mut body: RequestBody = match serde_json::from_str(&line) {
                Ok(body) => body,
                Err(e) => {
                    log::warn!("Passing through unparsable response body: {}", e);
                    writeln!(stdout, "{}", line)?;
                    continue;
                }
            };
            filter.outlet(&mut body.messages).await;

            serde_json::to_writer(&mut stdout, &body).context("Failed to serialize response body")?;
            writeln!(stdout)?;
        }
        stdout.flush()?;
        Ok(())
    })
}
