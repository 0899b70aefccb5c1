//! Integration tests for the client side: requester and terminal session against a live server.
//!
//! Each test spins up the router on a random port with a wiremock generation API behind it.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use firm_ai::constants;
use firm_ai::flow::{FormEvent, FormFlow, Stage, Transition};
use firm_ai::requester::ConsultationRequester;
use firm_ai::session::{run_consultation, SessionOptions};
use firm_ai::web_server::router;
use firm_ai::{ConsultationRequest, ConsultationResult, Gateway, GatewayConfig};

/// Start the app on a random port, return its base URL.
async fn start_server(config: GatewayConfig) -> String {
    let app = router(Arc::new(Gateway::from_config(config)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

async fn llm_replying(status: u16, text: &str) -> MockServer {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        })))
        .mount(&llm)
        .await;
    llm
}

fn configured(llm: &MockServer) -> GatewayConfig {
    GatewayConfig::default()
        .with_api_key(Some("sk-test".to_string()))
        .with_api_base(llm.uri())
}

fn instant() -> SessionOptions {
    SessionOptions {
        welcome_delay: Duration::ZERO,
        response_delay: Duration::ZERO,
        ..SessionOptions::default()
    }
}

#[test_log::test(tokio::test)]
async fn test_requester_returns_generated_advice() {
    let llm = llm_replying(200, "Focus on local partnerships.").await;
    let requester = ConsultationRequester::new(&start_server(configured(&llm)).await);

    let result = requester
        .request(&ConsultationRequest::new("Acme", "bakery", "How do I grow my network?"))
        .await;

    assert_eq!(result, ConsultationResult::Advice("Focus on local partnerships.".to_string()));
}

#[test_log::test(tokio::test)]
async fn test_requester_absorbs_server_errors_into_fallback() {
    let llm = llm_replying(500, "ignored").await;
    let requester = ConsultationRequester::new(&start_server(configured(&llm)).await);

    let result = requester.request(&ConsultationRequest::new("Acme", "bakery", "q")).await;

    assert_eq!(result, ConsultationResult::Failed(constants::CLIENT_FALLBACK.to_string()));
}

#[test_log::test(tokio::test)]
async fn test_flow_reaches_response_even_when_unconfigured() {
    let requester = ConsultationRequester::new(&start_server(GatewayConfig::default()).await);
    let mut flow = FormFlow::new();
    flow.apply(FormEvent::IntroFinished).unwrap();
    flow.set_company_name("Acme");
    flow.apply(FormEvent::Continue).unwrap();
    flow.set_business_type("bakery");
    flow.apply(FormEvent::Continue).unwrap();
    flow.set_query("How do I grow my network?");

    let Transition::Submit(request) = flow.apply(FormEvent::Continue).unwrap() else {
        panic!("query stage should submit");
    };
    let result = requester.request(&request).await;
    flow.apply(FormEvent::ResultReceived(result)).unwrap();

    assert_eq!(flow.stage(), Stage::Response);
    assert_eq!(flow.result().unwrap().text(), constants::CLIENT_FALLBACK);
}

#[test_log::test(tokio::test)]
async fn test_terminal_session_walks_every_stage() {
    let llm = llm_replying(200, "Focus on local partnerships.").await;
    let requester = ConsultationRequester::new(&start_server(configured(&llm)).await);
    let export_dir = tempfile::tempdir().unwrap();
    let options = SessionOptions { export_dir: export_dir.path().to_path_buf(), ..instant() };

    let script = "\n\
                  Acme\n\
                  :back\n\
                  \n\
                  bakery\n\
                  1\n\
                  :share\n\
                  :export\n\
                  :quit\n";
    let mut out = Vec::new();

    let flow = run_consultation(&requester, script.as_bytes(), &mut out, &options)
        .await
        .unwrap();

    let transcript = String::from_utf8(out).unwrap();
    assert!(transcript.starts_with("Welcome to Firm AI\n"));
    assert!(transcript.contains("the company-name field must not be empty"));
    assert!(transcript.contains("Focus on local partnerships."));
    assert!(transcript.contains("Share link: https://wa.me/?text=Acme"));

    assert_eq!(flow.stage(), Stage::Response);
    assert_eq!(flow.company_name(), "Acme");
    assert_eq!(flow.query(), constants::QUERY_SUGGESTIONS[0]);

    let exported =
        std::fs::read_to_string(export_dir.path().join("Acme-consultation.txt")).unwrap();
    assert!(exported.starts_with("Acme - Business Consultation\n\nBusiness Type: bakery"));
    assert!(exported.ends_with("Response:\nFocus on local partnerships."));
}

#[test_log::test(tokio::test)]
async fn test_terminal_session_reset_starts_over() {
    let llm = llm_replying(200, "Advice.").await;
    let requester = ConsultationRequester::new(&start_server(configured(&llm)).await);

    let script = "Acme\nbakery\nWhat should I price bread at?\n:reset\n";
    let mut out = Vec::new();
    let flow = run_consultation(&requester, script.as_bytes(), &mut out, &instant())
        .await
        .unwrap();

    assert_eq!(flow.stage(), Stage::CompanyName);
    assert_eq!(flow.company_name(), "");
    assert!(flow.result().is_none());
}

#[test_log::test(tokio::test)]
async fn test_numeric_query_outside_suggestions_is_submitted_as_text() {
    let llm = llm_replying(200, "Advice.").await;
    let requester = ConsultationRequester::new(&start_server(configured(&llm)).await);

    for query in ["2024", "0", "7"] {
        let script = format!("Acme\nbakery\n{}\n", query);
        let mut out = Vec::new();
        let flow = run_consultation(&requester, script.as_bytes(), &mut out, &instant())
            .await
            .unwrap();

        let transcript = String::from_utf8(out).unwrap();
        assert!(!transcript.contains("no suggestion"), "{}", transcript);
        assert_eq!(flow.stage(), Stage::Response);
        assert_eq!(flow.query(), query);
    }
}

#[test_log::test(tokio::test)]
async fn test_last_listed_number_picks_last_suggestion() {
    let llm = llm_replying(200, "Advice.").await;
    let requester = ConsultationRequester::new(&start_server(configured(&llm)).await);

    let script = format!("Acme\nbakery\n{}\n", constants::QUERY_SUGGESTIONS.len());
    let mut out = Vec::new();
    let flow = run_consultation(&requester, script.as_bytes(), &mut out, &instant())
        .await
        .unwrap();

    assert_eq!(flow.stage(), Stage::Response);
    assert_eq!(flow.query(), *constants::QUERY_SUGGESTIONS.last().unwrap());
}
