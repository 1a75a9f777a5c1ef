//! Google Gemini API Client.
//!
//! Supports:
//! - generateContent with generation config and optional system instruction
//! - Request timeout plus bounded retries with a fixed delay

use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::GeminiSettings;
use crate::{Error, Result};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
    retry_delay: Duration,
}

impl GeminiClient {
    /// Create a client from the GEMINI_API_KEY environment variable.
    pub fn from_env(settings: &GeminiSettings) -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| Error::MissingEnv("GEMINI_API_KEY".to_string()))?;
        Self::new(api_key, settings)
    }

    /// Create a client with an API key and request settings.
    pub fn new<S: Into<String>>(api_key: S, settings: &GeminiSettings) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidArgument("GEMINI_API_KEY is empty".to_string()));
        }

        let http = Client::builder()
            .user_agent("factcheck_bot/0.1.0")
            .timeout(settings.timeout())
            .build()
            .map_err(|e| Error::GeminiError(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: GEMINI_API_URL.to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            max_retries: settings.max_retries,
            retry_delay: settings.retry_delay(),
        })
    }

    /// Override the model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Override the API base URL (proxies, tests).
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Model currently in use.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a completion for the prompt, retrying transient failures.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system(prompt, None).await
    }

    /// Generate a completion with an optional system instruction.
    pub async fn generate_with_system(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.generate_once(prompt, system).await {
                Ok(text) => return Ok(text),
                Err(err) if attempt < self.max_retries && err.is_retryable() => {
                    attempt += 1;
                    warn!(
                        "Gemini request failed (attempt {}/{}): {}",
                        attempt, self.max_retries, err
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => return Err(err.into_error()),
            }
        }
    }

    async fn generate_once(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> std::result::Result<String, RequestError> {
        let mut payload = GeminiRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            }),
            system_instruction: None,
        };

        if let Some(sys) = system {
            payload.system_instruction = Some(SystemInstruction {
                parts: vec![Part {
                    text: sys.to_string(),
                }],
            });
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RequestError::Transport(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RequestError::Transport(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = format!("Gemini error {}: {}", status, text);
            if status.is_server_error() || status.as_u16() == 429 {
                return Err(RequestError::Transport(message));
            }
            return Err(RequestError::Fatal(message));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| RequestError::Fatal(format!("Invalid Gemini response: {}", e)))?;

        gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| RequestError::Fatal("Empty response from Gemini".to_string()))
    }
}

/// Internal error split: transport/5xx/429 failures are retried, the rest not.
#[derive(Debug)]
enum RequestError {
    Transport(String),
    Fatal(String),
}

impl RequestError {
    fn is_retryable(&self) -> bool {
        matches!(self, RequestError::Transport(_))
    }

    fn into_error(self) -> Error {
        match self {
            RequestError::Transport(msg) | RequestError::Fatal(msg) => Error::GeminiError(msg),
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::Transport(msg) | RequestError::Fatal(msg) => write!(f, "{}", msg),
        }
    }
}

// === Request structures ===

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "generationConfig")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "systemInstruction")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

// === Response structures ===

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn settings() -> GeminiSettings {
        GeminiSettings {
            retry_delay_secs: 0.01,
            ..GeminiSettings::default()
        }
    }

    fn client(server: &MockServer) -> GeminiClient {
        let mut client = GeminiClient::new("test_key", &settings()).expect("client");
        client.base_url = server.base_url();
        client
    }

    #[test]
    fn test_new_rejects_empty_key() {
        let err = GeminiClient::new("   ", &settings()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_with_model() {
        let client = GeminiClient::new("test_key", &settings())
            .unwrap()
            .with_model("gemini-1.5-pro");
        assert_eq!(client.model(), "gemini-1.5-pro");
    }

    #[tokio::test]
    async fn generate_returns_first_candidate_text() {
        let server = MockServer::start_async().await;

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/models/gemini-1.5-flash:generateContent")
                .query_param("key", "test_key");
            then.status(200).json_body(json!({
                "candidates": [
                    { "content": { "role": "model", "parts": [ { "text": "ACCURACY: True" } ] } }
                ]
            }));
        });

        let reply = client(&server).generate("check this").await.unwrap();

        assert_eq!(reply, "ACCURACY: True");
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn generate_sends_generation_config() {
        let server = MockServer::start_async().await;

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/models/gemini-1.5-flash:generateContent")
                .is_true(|req| {
                    let body = String::from_utf8_lossy(req.body().as_ref());
                    body.contains("maxOutputTokens") && body.contains("temperature")
                });
            then.status(200).json_body(json!({
                "candidates": [
                    { "content": { "role": "model", "parts": [ { "text": "ok" } ] } }
                ]
            }));
        });

        let reply = client(&server).generate("check this").await.unwrap();
        assert_eq!(reply, "ok");
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn generate_with_system_includes_instruction() {
        let server = MockServer::start_async().await;

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/models/gemini-1.5-flash:generateContent")
                .is_true(|req| {
                    let body = String::from_utf8_lossy(req.body().as_ref());
                    body.contains("systemInstruction") && body.contains("be objective")
                });
            then.status(200).json_body(json!({
                "candidates": [
                    { "content": { "role": "model", "parts": [ { "text": "done" } ] } }
                ]
            }));
        });

        let reply = client(&server)
            .generate_with_system("claim", Some("be objective"))
            .await
            .unwrap();

        assert_eq!(reply, "done");
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn generate_returns_error_on_client_error_status() {
        let server = MockServer::start_async().await;

        let mock = server.mock(|when, then| {
            when.method(POST).path("/models/gemini-1.5-flash:generateContent");
            then.status(400).body("bad request");
        });

        let err = client(&server).generate("check").await.unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("Gemini error 400"));
        assert!(msg.contains("bad request"));
        // 400 is not retried
        mock.assert_calls(1);
    }

    #[tokio::test]
    async fn generate_retries_server_errors_up_to_limit() {
        let server = MockServer::start_async().await;

        let mock = server.mock(|when, then| {
            when.method(POST).path("/models/gemini-1.5-flash:generateContent");
            then.status(500).body("internal");
        });

        let err = client(&server).generate("check").await.unwrap_err();

        assert!(err.to_string().contains("Gemini error 500"));
        // Initial attempt + max_retries (2)
        mock.assert_calls(3);
    }

    #[tokio::test]
    async fn generate_returns_error_on_invalid_json() {
        let server = MockServer::start_async().await;

        server.mock(|when, then| {
            when.method(POST).path("/models/gemini-1.5-flash:generateContent");
            then.status(200).body("not json");
        });

        let err = client(&server).generate("check").await.unwrap_err();
        assert!(err.to_string().contains("Invalid Gemini response"));
    }

    #[tokio::test]
    async fn generate_returns_error_on_empty_candidates() {
        let server = MockServer::start_async().await;

        server.mock(|when, then| {
            when.method(POST).path("/models/gemini-1.5-flash:generateContent");
            then.status(200).json_body(json!({ "candidates": [] }));
        });

        let err = client(&server).generate("check").await.unwrap_err();
        assert!(err.to_string().contains("Empty response from Gemini"));
    }
}
