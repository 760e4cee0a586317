//! Gemini `generateContent` as the translation collaborator

use crate::error::TranslationError;
use crate::pipeline::Translator;
use reqwest::blocking::{Client, Request};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Instruction sent ahead of the recognised text
pub fn translation_prompt(text: &str, target_language: &str) -> String {
    format!(
        "You are an expert translator. Translate the following English text into natural, \
         fluent {target_language}. Only provide the translated text.\n\n\
         English: {text}\n{target_language}:"
    )
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pull the first candidate's text out of a successful response body
pub fn parse_translation(body: &str) -> Result<String, TranslationError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(TranslationError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(TranslationError::EmptyResponse);
    }
    Ok(text.to_string())
}

/// Best human-readable message from an error response body
pub fn parse_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}

/// Transport failure with the request URL stripped
fn network_error(err: reqwest::Error) -> TranslationError {
    TranslationError::Network(err.without_url())
}

pub struct GeminiTranslator {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    target_language: String,
}

impl GeminiTranslator {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_base: API_BASE.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            target_language: target_language.into(),
        })
    }

    /// Point at another `.../models` base, e.g. a local gateway
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.api_base.trim_end_matches('/'), self.model)
    }

    /// The key travels in a header so it never shows up in a URL
    fn request(&self, text: &str) -> Result<Request, TranslationError> {
        let prompt = translation_prompt(text, &self.target_language);
        let body = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: &prompt }],
            }],
        };

        self.client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .build()
            .map_err(network_error)
    }
}

impl Translator for GeminiTranslator {
    fn translate(&mut self, text: &str) -> Result<String, TranslationError> {
        let request = self.request(text)?;

        debug!(model = %self.model, chars = text.len(), "requesting translation");
        let response = self.client.execute(request).map_err(network_error)?;

        let status = response.status();
        let body = response.text().map_err(network_error)?;

        if !status.is_success() {
            let message = parse_error_message(&body);
            warn!(status = status.as_u16(), %message, "translation request rejected");
            return Err(TranslationError::Server {
                status: status.as_u16(),
                message,
            });
        }

        parse_translation(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::error_text;

    #[test]
    fn prompt_names_target_language_and_carries_text() {
        let prompt = translation_prompt("Hello world", "Korean");
        assert!(prompt.starts_with("You are an expert translator."));
        assert!(prompt.contains("natural, fluent Korean."));
        assert!(prompt.contains("English: Hello world\nKorean:"));
    }

    #[test]
    fn request_body_has_single_text_part() {
        let request = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: "hi" }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"contents": [{"parts": [{"text": "hi"}]}]}));
    }

    #[test]
    fn first_candidate_text_is_trimmed() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"  안녕 세계\n"}],"role":"model"}},
                       {"content":{"parts":[{"text":"other"}]}}]}"#;
        assert_eq!(parse_translation(body).unwrap(), "안녕 세계");
    }

    #[test]
    fn missing_candidates_is_empty_response() {
        assert!(matches!(
            parse_translation(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#),
            Err(TranslationError::EmptyResponse)
        ));
        assert!(matches!(
            parse_translation(r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#),
            Err(TranslationError::EmptyResponse)
        ));
        assert!(matches!(
            parse_translation(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#),
            Err(TranslationError::EmptyResponse)
        ));
    }

    #[test]
    fn malformed_body_is_invalid_response() {
        assert!(matches!(
            parse_translation("<html>bad gateway</html>"),
            Err(TranslationError::InvalidResponse(_))
        ));
    }

    #[test]
    fn api_key_goes_in_header_not_url() {
        let translator = GeminiTranslator::new("SECRET-KEY-123", "gemini-1.5-flash", "Korean").unwrap();
        let request = translator.request("Hello").unwrap();

        assert_eq!(request.url().query(), None);
        assert!(!request.url().as_str().contains("SECRET"));
        assert_eq!(
            request.url().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(request.headers()[API_KEY_HEADER], "SECRET-KEY-123");
    }

    #[test]
    fn network_failure_text_never_contains_api_key() {
        // Nothing listens on the discard port, so the connect is refused
        let mut translator = GeminiTranslator::new("SECRET-KEY-123", "gemini-1.5-flash", "Korean")
            .unwrap()
            .with_api_base("http://127.0.0.1:9/v1beta/models");

        let err = translator.translate("Hello").unwrap_err();
        assert!(matches!(err, TranslationError::Network(_)));

        let shown = error_text(&err.into());
        assert!(shown.starts_with("Error: Network error"));
        assert!(!shown.contains("SECRET-KEY-123"));
    }

    #[test]
    fn error_message_prefers_api_envelope() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(parse_error_message(body), "Resource has been exhausted");
        assert_eq!(parse_error_message(" upstream down \n"), "upstream down");
    }
}
