//! Firm AI: a guided business-consultation form backed by a hosted LLM.
//!
//! The gateway (`gateway`, served by `web_server`) validates a consultation, forwards it to the
//! generation API and hands successful results to the interaction logger. The form itself is
//! the state machine in `flow`, driven either by the web page or by the terminal `session`.

pub mod config;
pub mod constants;
pub mod consultation;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod generation;
pub mod interaction_log;
pub mod requester;
pub mod session;
pub mod typewriter;
pub mod web_server;

pub use config::GatewayConfig;
pub use consultation::{ConsultationRequest, ConsultationResult, LogEntry};
pub use gateway::Gateway;
