use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::config::GatewayConfig;
use crate::consultation::{ConsultationRequest, LogEntry};
use crate::error::ConsultError;
use crate::generation::{build_prompt, AdviceGenerator, OpenAiGenerator};
use crate::interaction_log::InteractionLogger;

/// Mediates between the consultation form and the generation API.
///
/// Holds no per-request state; one instance is shared by every handler.
pub struct Gateway {
    config: GatewayConfig,
    generator: Arc<dyn AdviceGenerator>,
    logger: InteractionLogger,
}

impl Gateway {
    pub fn new(
        config: GatewayConfig,
        generator: Arc<dyn AdviceGenerator>,
        logger: InteractionLogger,
    ) -> Self {
        Self {
            config,
            generator,
            logger,
        }
    }

    /// Wires the OpenAI generator and the webhook logger described by `config`.
    pub fn from_config(config: GatewayConfig) -> Self {
        let generator = Arc::new(OpenAiGenerator::new(&config));
        let logger = InteractionLogger::new(config.webhook_url.clone());
        Self::new(config, generator, logger)
    }

    /// Produces advice for one submission.
    ///
    /// Validation and configuration failures return before any outbound call. A successful
    /// generation is handed to the interaction logger without waiting on it.
    #[instrument(skip(self, request), fields(company = %request.company_name))]
    pub async fn consult(&self, request: ConsultationRequest) -> Result<String, ConsultError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            warn!(?missing, "Rejecting consultation with missing fields");
            return Err(ConsultError::MissingFields(missing));
        }

        if !self.config.has_api_key() {
            error!("Generation API key is not configured");
            return Err(ConsultError::ConfigurationMissing);
        }

        let prompt = build_prompt(&request);
        let text = match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Error generating consultation");
                return Err(ConsultError::GenerationFailed(e));
            }
        };
        info!(chars = text.len(), "Consultation generated");

        // The log task is spawned here, before the handler returns, so on a multi-threaded
        // runtime its POST may start before the HTTP response is written. It is never awaited:
        // its latency and outcome cannot reach the response, which is all callers observe.
        let _ = self.logger.record(LogEntry::new(&request, &text));

        Ok(text)
    }
}
