//! The consultation form as a finite-state machine.
//!
//! Stages run strictly in order: welcome, company name, business type, query, response.
//! `Back` is the only backwards edge and exists from business type and query. Field values
//! survive `Back`; only `Reset` clears them.

use std::fmt;

use reqwest::Url;

use crate::consultation::{ConsultationRequest, ConsultationResult};
use crate::constants;
use crate::error::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Welcome,
    CompanyName,
    BusinessType,
    Query,
    Response,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Welcome => "welcome",
            Stage::CompanyName => "company-name",
            Stage::BusinessType => "business-type",
            Stage::Query => "query",
            Stage::Response => "response",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The welcome animation finished.
    IntroFinished,
    /// Submit the current stage's field.
    Continue,
    Back,
    /// The outstanding consultation request completed.
    ResultReceived(ConsultationResult),
    /// Start a new consultation from the response stage.
    Reset,
}

impl FormEvent {
    fn name(&self) -> &'static str {
        match self {
            FormEvent::IntroFinished => "intro-finished",
            FormEvent::Continue => "continue",
            FormEvent::Back => "back",
            FormEvent::ResultReceived(_) => "result-received",
            FormEvent::Reset => "reset",
        }
    }
}

/// What the caller must do after a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The form now shows `Stage`.
    Moved(Stage),
    /// Send this request; report its outcome with `FormEvent::ResultReceived`.
    Submit(ConsultationRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFlow {
    stage: Stage,
    company_name: String,
    business_type: String,
    query: String,
    in_flight: bool,
    result: Option<ConsultationResult>,
}

impl Default for FormFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl FormFlow {
    pub fn new() -> Self {
        Self {
            stage: Stage::Welcome,
            company_name: String::new(),
            business_type: String::new(),
            query: String::new(),
            in_flight: false,
            result: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn business_type(&self) -> &str {
        &self.business_type
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn result(&self) -> Option<&ConsultationResult> {
        self.result.as_ref()
    }

    /// True while a submitted request has not reported back. The submit control is disabled.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn set_company_name(&mut self, value: impl Into<String>) {
        self.company_name = value.into();
    }

    pub fn set_business_type(&mut self, value: impl Into<String>) {
        self.business_type = value.into();
    }

    pub fn set_query(&mut self, value: impl Into<String>) {
        self.query = value.into();
    }

    /// Replaces the query with one of the canned suggestions.
    pub fn choose_suggestion(&mut self, index: usize) -> Result<&'static str, FlowError> {
        let suggestion = constants::QUERY_SUGGESTIONS
            .get(index)
            .copied()
            .ok_or(FlowError::UnknownSuggestion(index))?;
        self.query = suggestion.to_string();
        Ok(suggestion)
    }

    /// Sets the field edited in the current stage, if it has one.
    pub fn set_current_field(&mut self, value: impl Into<String>) -> Result<(), FlowError> {
        match self.stage {
            Stage::CompanyName => self.set_company_name(value),
            Stage::BusinessType => self.set_business_type(value),
            Stage::Query if !self.in_flight => self.set_query(value),
            Stage::Query => return Err(FlowError::RequestInFlight),
            stage => return Err(FlowError::InvalidEvent { stage, event: "edit" }),
        }
        Ok(())
    }

    pub fn apply(&mut self, event: FormEvent) -> Result<Transition, FlowError> {
        let stage = self.stage;
        let next = match (stage, event) {
            (Stage::Welcome, FormEvent::IntroFinished) => Stage::CompanyName,

            (Stage::CompanyName, FormEvent::Continue) => {
                require(&self.company_name, stage)?;
                Stage::BusinessType
            }
            (Stage::BusinessType, FormEvent::Continue) => {
                require(&self.business_type, stage)?;
                Stage::Query
            }
            (Stage::Query, FormEvent::Continue) => {
                if self.in_flight {
                    return Err(FlowError::RequestInFlight);
                }
                require(&self.query, stage)?;
                self.in_flight = true;
                return Ok(Transition::Submit(ConsultationRequest::new(
                    self.company_name.clone(),
                    self.business_type.clone(),
                    self.query.clone(),
                )));
            }

            (Stage::Query, FormEvent::ResultReceived(result)) => {
                if !self.in_flight {
                    return Err(FlowError::NoRequestInFlight);
                }
                self.in_flight = false;
                self.result = Some(result);
                Stage::Response
            }

            (Stage::BusinessType, FormEvent::Back) => Stage::CompanyName,
            (Stage::Query, FormEvent::Back) if self.in_flight => {
                return Err(FlowError::RequestInFlight)
            }
            (Stage::Query, FormEvent::Back) => Stage::BusinessType,
            (stage, FormEvent::Back) => return Err(FlowError::NoBackEdge(stage)),

            (Stage::Response, FormEvent::Reset) => {
                self.company_name.clear();
                self.business_type.clear();
                self.query.clear();
                self.result = None;
                Stage::CompanyName
            }

            (stage, event) => {
                return Err(FlowError::InvalidEvent { stage, event: event.name() })
            }
        };

        tracing::debug!(from = %stage, to = %next, "Form stage changed");
        self.stage = next;
        Ok(Transition::Moved(next))
    }

    fn response_text(&self) -> &str {
        self.result.as_ref().map(ConsultationResult::text).unwrap_or_default()
    }

    /// Short plain-text summary handed to the share target.
    pub fn share_text(&self) -> String {
        format!(
            "{} - Business Consultation\n\nQuery: {}\n\nResponse: {}",
            self.company_name,
            self.query,
            self.response_text()
        )
    }

    /// WhatsApp share link carrying `share_text` as its encoded `text` parameter.
    pub fn share_url(&self) -> String {
        Url::parse_with_params(constants::SHARE_BASE_URL, &[("text", self.share_text())])
            .map(String::from)
            .unwrap_or_else(|_| constants::SHARE_BASE_URL.to_string())
    }

    /// Full plain-text export including the business type.
    pub fn export_text(&self) -> String {
        format!(
            "{} - Business Consultation\n\nBusiness Type: {}\n\nQuery: {}\n\nResponse:\n{}",
            self.company_name,
            self.business_type,
            self.query,
            self.response_text()
        )
    }

    pub fn export_file_name(&self) -> String {
        let safe: String = self
            .company_name
            .trim()
            .chars()
            .map(|c| if c == '/' || c == '\\' { '-' } else { c })
            .collect();
        format!("{}-consultation.txt", safe)
    }
}

fn require(value: &str, stage: Stage) -> Result<(), FlowError> {
    if value.trim().is_empty() {
        Err(FlowError::EmptyField(stage))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_query() -> FormFlow {
        let mut flow = FormFlow::new();
        flow.apply(FormEvent::IntroFinished).unwrap();
        flow.set_company_name("Acme");
        flow.apply(FormEvent::Continue).unwrap();
        flow.set_business_type("bakery");
        flow.apply(FormEvent::Continue).unwrap();
        flow
    }

    fn at_response() -> FormFlow {
        let mut flow = at_query();
        flow.set_query("How do I grow my network?");
        flow.apply(FormEvent::Continue).unwrap();
        flow.apply(FormEvent::ResultReceived(ConsultationResult::Advice(
            "Focus on local partnerships.".to_string(),
        )))
        .unwrap();
        flow
    }

    #[test]
    fn test_company_name_advances_and_back_preserves_it() {
        let mut flow = FormFlow::new();
        flow.apply(FormEvent::IntroFinished).unwrap();
        assert_eq!(flow.stage(), Stage::CompanyName);

        flow.set_company_name("Acme");
        assert_eq!(
            flow.apply(FormEvent::Continue).unwrap(),
            Transition::Moved(Stage::BusinessType)
        );

        assert_eq!(
            flow.apply(FormEvent::Back).unwrap(),
            Transition::Moved(Stage::CompanyName)
        );
        assert_eq!(flow.company_name(), "Acme");
    }

    #[test]
    fn test_blank_fields_do_not_advance() {
        let mut flow = FormFlow::new();
        flow.apply(FormEvent::IntroFinished).unwrap();
        flow.set_company_name("   ");
        assert_eq!(
            flow.apply(FormEvent::Continue),
            Err(FlowError::EmptyField(Stage::CompanyName))
        );
        assert_eq!(flow.stage(), Stage::CompanyName);

        let mut flow = at_query();
        assert_eq!(flow.apply(FormEvent::Continue), Err(FlowError::EmptyField(Stage::Query)));
        assert!(!flow.is_in_flight());
    }

    #[test]
    fn test_stages_cannot_be_skipped() {
        let mut flow = FormFlow::new();
        assert!(flow.apply(FormEvent::Continue).is_err());
        assert_eq!(flow.stage(), Stage::Welcome);
        flow.apply(FormEvent::IntroFinished).unwrap();
        assert!(flow.apply(FormEvent::IntroFinished).is_err());
        assert!(flow
            .apply(FormEvent::ResultReceived(ConsultationResult::Advice("x".into())))
            .is_err());
        assert_eq!(flow.stage(), Stage::CompanyName);
    }

    #[test]
    fn test_back_only_from_business_type_and_query() {
        let mut flow = FormFlow::new();
        assert_eq!(flow.apply(FormEvent::Back), Err(FlowError::NoBackEdge(Stage::Welcome)));
        flow.apply(FormEvent::IntroFinished).unwrap();
        assert_eq!(flow.apply(FormEvent::Back), Err(FlowError::NoBackEdge(Stage::CompanyName)));

        let mut flow = at_query();
        flow.set_query("draft");
        assert_eq!(flow.apply(FormEvent::Back).unwrap(), Transition::Moved(Stage::BusinessType));
        assert_eq!(flow.business_type(), "bakery");
        assert_eq!(flow.query(), "draft");

        let mut flow = at_response();
        assert_eq!(flow.apply(FormEvent::Back), Err(FlowError::NoBackEdge(Stage::Response)));
    }

    #[test]
    fn test_query_submission_is_single_flight() {
        let mut flow = at_query();
        flow.set_query("How do I grow my network?");

        let submitted = flow.apply(FormEvent::Continue).unwrap();
        assert_eq!(
            submitted,
            Transition::Submit(ConsultationRequest::new(
                "Acme",
                "bakery",
                "How do I grow my network?"
            ))
        );
        assert!(flow.is_in_flight());
        assert_eq!(flow.apply(FormEvent::Continue), Err(FlowError::RequestInFlight));
        assert_eq!(flow.apply(FormEvent::Back), Err(FlowError::RequestInFlight));
        assert_eq!(flow.set_current_field("changed"), Err(FlowError::RequestInFlight));

        flow.apply(FormEvent::ResultReceived(ConsultationResult::Failed("sorry".into())))
            .unwrap();
        assert_eq!(flow.stage(), Stage::Response);
        assert!(!flow.is_in_flight());
        assert_eq!(flow.result().unwrap().text(), "sorry");
    }

    #[test]
    fn test_result_without_request_is_rejected() {
        let mut flow = at_query();
        assert_eq!(
            flow.apply(FormEvent::ResultReceived(ConsultationResult::Advice("x".into()))),
            Err(FlowError::NoRequestInFlight)
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut flow = at_response();
        assert_eq!(flow.apply(FormEvent::Reset).unwrap(), Transition::Moved(Stage::CompanyName));
        assert_eq!(flow.company_name(), "");
        assert_eq!(flow.business_type(), "");
        assert_eq!(flow.query(), "");
        assert!(flow.result().is_none());
    }

    #[test]
    fn test_choose_suggestion() {
        let mut flow = at_query();
        assert_eq!(flow.choose_suggestion(0).unwrap(), "How do I grow my network?");
        assert_eq!(flow.query(), "How do I grow my network?");
        assert_eq!(flow.choose_suggestion(6), Err(FlowError::UnknownSuggestion(6)));
    }

    #[test]
    fn test_share_and_export_text() {
        let flow = at_response();
        assert_eq!(
            flow.share_text(),
            "Acme - Business Consultation\n\nQuery: How do I grow my network?\n\nResponse: Focus on local partnerships."
        );
        assert!(flow.export_text().contains("Business Type: bakery\n\n"));
        assert!(flow.export_text().ends_with("Response:\nFocus on local partnerships."));
        assert_eq!(flow.export_file_name(), "Acme-consultation.txt");
    }

    #[test]
    fn test_share_url_is_encoded() {
        let url = at_response().share_url();
        assert!(url.starts_with("https://wa.me/?text=Acme"));
        assert!(!url.contains(' '));
        assert!(!url.contains('\n'));
    }
}
