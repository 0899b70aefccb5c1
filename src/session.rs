// Interactive terminal consultation.
// Drives the same form flow as the web page: each stage reads one line from the input.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::constants;
use crate::flow::{FormEvent, FormFlow, Stage, Transition};
use crate::requester::ConsultationRequester;
use crate::typewriter;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub welcome_delay: Duration,
    pub response_delay: Duration,
    /// Directory receiving `:export` files.
    pub export_dir: PathBuf,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            welcome_delay: Duration::from_millis(constants::WELCOME_CHAR_DELAY_MS),
            response_delay: Duration::from_millis(constants::RESPONSE_CHAR_DELAY_MS),
            export_dir: PathBuf::from("."),
        }
    }
}

fn prompt_for(flow: &FormFlow) -> String {
    match flow.stage() {
        Stage::CompanyName => "What's your company name?".to_string(),
        Stage::BusinessType => format!(
            "What type of business is {}? (:back to edit the name)",
            flow.company_name()
        ),
        Stage::Query => {
            let mut text = String::from(
                "What would you like to know? Pick a number or type your own (:back)\n",
            );
            for (i, s) in constants::QUERY_SUGGESTIONS.iter().enumerate() {
                text.push_str(&format!("  {}. {}\n", i + 1, s));
            }
            text
        }
        Stage::Response => "Commands: :share, :export, :reset, :quit".to_string(),
        Stage::Welcome => String::new(),
    }
}

/// Runs one interactive session until `:quit` or end of input.
pub async fn run_consultation<R, W>(
    requester: &ConsultationRequester,
    input: R,
    out: &mut W,
    options: &SessionOptions,
) -> Result<FormFlow>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut flow = FormFlow::new();
    let mut lines = input.lines();

    typewriter::play(constants::WELCOME_TEXT, options.welcome_delay, out).await?;
    flow.apply(FormEvent::IntroFinished)?;

    loop {
        writeln!(out, "{}", prompt_for(&flow))?;
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            debug!("Input closed, ending session");
            break;
        };
        let line = line.trim();

        match (flow.stage(), line) {
            (_, ":quit") => break,
            (Stage::Response, ":share") => {
                writeln!(out, "Share link: {}", flow.share_url())?;
            }
            (Stage::Response, ":export") => {
                let path = options.export_dir.join(flow.export_file_name());
                tokio::fs::write(&path, flow.export_text())
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), "Consultation exported");
                writeln!(out, "Saved to {}", path.display())?;
            }
            (Stage::Response, ":reset") => {
                flow.apply(FormEvent::Reset)?;
            }
            (Stage::Response, _) => {
                writeln!(out, "Unknown command.")?;
            }
            (_, ":back") => {
                if let Err(e) = flow.apply(FormEvent::Back) {
                    writeln!(out, "{}", e)?;
                }
            }
            (stage, value) => {
                // Only the listed numbers pick a suggestion; any other text is the query itself.
                let suggestion = value
                    .parse::<usize>()
                    .ok()
                    .filter(|n| {
                        stage == Stage::Query
                            && (1..=constants::QUERY_SUGGESTIONS.len()).contains(n)
                    })
                    .map(|n| n - 1);
                match suggestion {
                    Some(index) => {
                        if let Err(e) = flow.choose_suggestion(index) {
                            writeln!(out, "{}", e)?;
                            continue;
                        }
                    }
                    // A blank line keeps what was entered before going back.
                    None if value.is_empty() => {}
                    None => flow.set_current_field(value)?,
                }

                match flow.apply(FormEvent::Continue) {
                    Ok(Transition::Submit(request)) => {
                        writeln!(out, "Thinking...")?;
                        let result = requester.request(&request).await;
                        flow.apply(FormEvent::ResultReceived(result))?;
                        let text = flow.result().map(|r| r.text()).unwrap_or_default();
                        typewriter::play(text, options.response_delay, out).await?;
                    }
                    Ok(Transition::Moved(_)) => {}
                    Err(e) => writeln!(out, "{}", e)?,
                }
            }
        }
    }

    Ok(flow)
}
