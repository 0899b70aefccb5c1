//! Best-effort logging of consultations to an external spreadsheet webhook.
//!
//! Each entry is posted once from a detached task. The outcome goes to the operator log and,
//! when one is attached, to a diagnostic channel; it never reaches the caller that produced
//! the entry.

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::consultation::LogEntry;
use crate::error::LoggingError;

/// Result of one webhook delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutcome {
    Delivered { status: u16 },
    Rejected { status: u16 },
    Failed { reason: String },
}

#[derive(Clone)]
pub struct InteractionLogger {
    client: Client,
    webhook_url: Option<String>,
    diagnostics: Option<mpsc::UnboundedSender<LogOutcome>>,
}

impl InteractionLogger {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
            diagnostics: None,
        }
    }

    /// A logger with no webhook; every `record` is a no-op.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Attaches a channel receiving every delivery outcome.
    pub fn with_diagnostics(mut self) -> (Self, mpsc::UnboundedReceiver<LogOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.diagnostics = Some(tx);
        (self, rx)
    }

    /// Starts delivery of `entry` on a detached task and returns immediately.
    ///
    /// Returns `None` when no webhook is configured. The handle is only useful to tests;
    /// production callers drop it.
    pub fn record(&self, entry: LogEntry) -> Option<JoinHandle<()>> {
        let Some(url) = self.webhook_url.clone() else {
            debug!("No webhook configured, skipping interaction log");
            return None;
        };

        let client = self.client.clone();
        let diagnostics = self.diagnostics.clone();
        Some(tokio::spawn(async move {
            let outcome = match post_entry(&client, &url, &entry).await {
                Ok(status) => {
                    info!(status, "Interaction logged to webhook");
                    LogOutcome::Delivered { status }
                }
                Err(LoggingError::Rejected { status, body }) => {
                    warn!(status, %body, "Webhook rejected interaction log");
                    LogOutcome::Rejected { status }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to send interaction log");
                    LogOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            if let Some(tx) = diagnostics {
                // Receiver may already be gone; nobody else cares about the outcome.
                let _ = tx.send(outcome);
            }
        }))
    }
}

#[instrument(skip(client, entry))]
async fn post_entry(client: &Client, url: &str, entry: &LogEntry) -> Result<u16, LoggingError> {
    let response = client.post(url).json(entry).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LoggingError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    Ok(status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consultation::ConsultationRequest;

    fn entry() -> LogEntry {
        LogEntry::new(&ConsultationRequest::new("Acme", "bakery", "q"), "a")
    }

    #[tokio::test]
    async fn test_disabled_logger_is_a_no_op() {
        let (logger, mut rx) = InteractionLogger::disabled().with_diagnostics();
        assert!(logger.record(entry()).is_none());
        drop(logger);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_webhook_reports_failure_on_side_channel() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let (logger, mut rx) =
            InteractionLogger::new(Some("http://127.0.0.1:9/hook".to_string())).with_diagnostics();
        let handle = logger.record(entry()).unwrap();
        handle.await.unwrap();
        assert!(matches!(rx.recv().await, Some(LogOutcome::Failed { .. })));
    }
}
