use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::credential::Credential;
use crate::config::InferenceConfig;
use crate::error::{AispecError, Result};

/// Request body for the generate endpoint
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// One object of the response, streamed or single-shot.
///
/// Some servers put the text under `analysis` instead of `response`.
#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    analysis: Option<String>,
    #[serde(default)]
    done: bool,
}

impl GenerateChunk {
    fn into_text(self) -> Option<String> {
        self.response.or(self.analysis)
    }
}

/// Accumulates a newline-delimited JSON response.
///
/// Bytes can arrive split at arbitrary points; only complete lines are parsed.
#[derive(Default)]
pub struct StreamAccumulator {
    pending: Vec<u8>,
    text: String,
    done: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes. Returns true once an object with `done: true` was seen.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<bool> {
        if self.done {
            return Ok(true);
        }
        self.pending.extend_from_slice(bytes);

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if self.consume_line(&line[..line.len() - 1])? {
                self.done = true;
                self.pending.clear();
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Flush a trailing line without newline and return the accumulated text.
    pub fn finish(mut self) -> Result<String> {
        if !self.done && !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.consume_line(&rest)?;
        }
        Ok(self.text)
    }

    fn consume_line(&mut self, line: &[u8]) -> Result<bool> {
        let line = std::str::from_utf8(line)
            .map_err(|e| AispecError::Inference(format!("Response is not UTF-8: {}", e)))?
            .trim();
        if line.is_empty() {
            return Ok(false);
        }

        let chunk: GenerateChunk = serde_json::from_str(line).map_err(|e| {
            AispecError::Inference(format!("Malformed response line {:?}: {}", line, e))
        })?;
        let done = chunk.done;
        if let Some(fragment) = chunk.into_text() {
            log::debug!("fragment: {}", fragment);
            self.text.push_str(&fragment);
        }
        Ok(done)
    }
}

/// Client for an Ollama-style generate endpoint
pub struct InferenceClient {
    client: Client,
    api_url: String,
    model: String,
    stream: bool,
    max_retries: usize,
    retry_delay: Duration,
    credential: Option<Credential>,
}

impl InferenceClient {
    pub fn new(config: &InferenceConfig, credential: Option<Credential>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AispecError::Inference(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            stream: config.stream,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            credential,
        })
    }

    /// Make a single request and return the full response text
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: self.stream,
        };

        let mut builder = self.client.post(&self.api_url).json(&request);
        if let Some(credential) = &self.credential {
            builder = builder.bearer_auth(credential.token());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AispecError::Inference(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(AispecError::Inference(format!(
                "Endpoint returned {}: {}",
                status, body
            )));
        }

        if self.stream {
            let mut accumulator = StreamAccumulator::new();
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk
                    .map_err(|e| AispecError::Inference(format!("Stream interrupted: {}", e)))?;
                if accumulator.feed(&chunk)? {
                    break;
                }
            }
            accumulator.finish()
        } else {
            let chunk: GenerateChunk = response
                .json()
                .await
                .map_err(|e| AispecError::Inference(format!("Failed to parse response: {}", e)))?;
            chunk.into_text().ok_or_else(|| {
                AispecError::Inference("Response has neither `response` nor `analysis`".to_string())
            })
        }
    }

    /// `generate` with bounded retry and exponential backoff
    pub async fn generate_with_retry(&self, prompt: &str) -> Result<String> {
        let start = std::time::Instant::now();
        let mut attempt = 0;
        let mut delay = self.retry_delay;

        loop {
            match self.generate(prompt).await {
                Ok(text) => {
                    log::debug!(
                        "Inference call took {:?} (attempt {})",
                        start.elapsed(),
                        attempt + 1
                    );
                    return Ok(text);
                }
                Err(e) if attempt < self.max_retries => {
                    log::warn!("Retry {}/{} after error: {}", attempt + 1, self.max_retries, e);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, stream: bool) -> InferenceConfig {
        InferenceConfig {
            api_url: format!("{}/api/generate", server.uri()),
            stream,
            retry_delay_ms: 0,
            ..InferenceConfig::default()
        }
    }

    #[test]
    fn test_accumulator_handles_split_lines() {
        let mut acc = StreamAccumulator::new();
        assert!(!acc.feed(b"{\"response\":\"Hel").unwrap());
        assert!(!acc.feed(b"lo\",\"done\":false}\n\n{\"analysis\":\", ").unwrap());
        assert!(acc.feed(b"world\",\"done\":true}\n{\"response\":\"ignored\"}\n").unwrap());
        assert_eq!(acc.finish().unwrap(), "Hello, world");
    }

    #[test]
    fn test_accumulator_flushes_trailing_line() {
        let mut acc = StreamAccumulator::new();
        acc.feed(b"{\"response\":\"a\"}\n{\"response\":\"b\"}").unwrap();
        assert_eq!(acc.finish().unwrap(), "ab");
    }

    #[test]
    fn test_accumulator_rejects_garbage() {
        let mut acc = StreamAccumulator::new();
        assert!(acc.feed(b"not json\n").is_err());
    }

    #[tokio::test]
    async fn test_streamed_generate() {
        let server = MockServer::start().await;
        let body = "{\"response\":\"Defines \",\"done\":false}\n\
                    {\"response\":\"class Foo.\",\"done\":false}\n\
                    {\"response\":\"\",\"done\":true}\n";
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "codellama:34b",
                "stream": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = InferenceClient::new(&config_for(&server, true), None).unwrap();
        let text = client.generate("summarize").await.unwrap();
        assert_eq!(text, "Defines class Foo.");
    }

    #[tokio::test]
    async fn test_single_shot_generate_with_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"analysis": "A parser.", "done": true})),
            )
            .mount(&server)
            .await;

        let client =
            InferenceClient::new(&config_for(&server, false), Some(Credential::new("tok"))).unwrap();
        assert_eq!(client.generate("x").await.unwrap(), "A parser.");
    }

    #[tokio::test]
    async fn test_retry_once_then_succeed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("{\"response\":\"ok\",\"done\":true}\n"),
            )
            .mount(&server)
            .await;

        let client = InferenceClient::new(&config_for(&server, true), None).unwrap();
        assert_eq!(client.generate_with_retry("x").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_retry_is_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let client = InferenceClient::new(&config_for(&server, true), None).unwrap();
        let err = client.generate_with_retry("x").await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
