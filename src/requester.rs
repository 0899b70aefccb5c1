use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::consultation::{ConsultationReply, ConsultationRequest, ConsultationResult};
use crate::constants;

/// Client side of `POST /api/consult`.
///
/// Every failure, whether transport, status or decoding, collapses into
/// `ConsultationResult::Failed` with the fixed fallback text, so the form always reaches its
/// response stage.
#[derive(Clone)]
pub struct ConsultationRequester {
    client: Client,
    endpoint: String,
}

impl ConsultationRequester {
    pub fn new(server: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/consult", server.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[instrument(skip(self, request), fields(endpoint = %self.endpoint))]
    pub async fn request(&self, request: &ConsultationRequest) -> ConsultationResult {
        match self.send(request).await {
            Ok(text) => {
                info!(chars = text.len(), "Consultation received");
                ConsultationResult::Advice(text)
            }
            Err(e) => {
                warn!(error = %e, "Consultation request failed");
                ConsultationResult::Failed(constants::CLIENT_FALLBACK.to_string())
            }
        }
    }

    async fn send(&self, request: &ConsultationRequest) -> Result<String, reqwest::Error> {
        let reply = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<ConsultationReply>()
            .await?;
        Ok(reply.response)
    }
}
