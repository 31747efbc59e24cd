//! Ollama HTTP API client.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;

use super::stream::{FragmentStream, LineDecoder};
use super::traits::Backend;
use super::types::{ChatMessage, MessageRole};
use crate::app::OllamaConfig;
use crate::constants::{OLLAMA_CHAT_PATH, OLLAMA_TAGS_PATH};
use crate::utils::{LmiError, LmiResult};

/// Backend talking to a running `ollama serve`
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: Client,
    base_url: String,
}

/// Request body for `/api/chat`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: MessageRole,
    content: &'a str,
}

/// One NDJSON object of a streamed `/api/chat` response.
#[derive(Debug, Deserialize)]
struct ChatStreamLine {
    #[serde(default)]
    message: Option<StreamMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamMessage {
    #[serde(default)]
    content: String,
}

/// Response from `/api/tags` (list models).
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl OllamaBackend {
    /// Create a client for the server at `base_url`, e.g. `http://localhost:11434`
    pub fn new(base_url: impl Into<String>) -> LmiResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(LmiError::ConfigError(format!(
                "Ollama URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        // No overall timeout: a long generation is allowed to take as long as it takes
        let client = Client::builder().build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &OllamaConfig) -> LmiResult<Self> {
        Self::new(config.base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the server answers the model listing endpoint
    pub async fn is_running(&self) -> bool {
        match self.client.get(self.url(OLLAMA_TAGS_PATH)).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_send_error(&self, error: reqwest::Error) -> LmiError {
        if error.is_connect() {
            LmiError::BackendNotRunning(self.base_url.clone())
        } else {
            LmiError::NetworkError(error)
        }
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    async fn list_models(&self) -> LmiResult<Vec<String>> {
        let response = self
            .client
            .get(self.url(OLLAMA_TAGS_PATH))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let tags: TagsResponse = ensure_success(response).await?.json().await?;
        let models: Vec<String> = tags
            .models
            .into_iter()
            .filter_map(|m| m.model.or(m.name))
            .collect();

        tracing::debug!("{} model(s) installed at {}", models.len(), self.base_url);
        Ok(models)
    }

    async fn chat_stream(&self, model: &str, messages: &[ChatMessage]) -> LmiResult<FragmentStream> {
        let request = ChatRequest {
            model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            stream: true,
        };

        tracing::info!("Chat request to {} ({} message(s))", model, messages.len());

        let response = self
            .client
            .post(self.url(OLLAMA_CHAT_PATH))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let response = ensure_success(response).await?;
        Ok(chat_fragments(response.bytes_stream()))
    }
}

/// Turn a non-2xx response into an API error carrying the server's message
async fn ensure_success(response: Response) -> LmiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);
    Err(LmiError::ApiError(format!("{}: {}", status, message)))
}

/// Parsed content of one stream line
#[derive(Debug, PartialEq)]
struct ChatLine {
    content: String,
    done: bool,
}

fn parse_chat_line(line: &str) -> LmiResult<Option<ChatLine>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let parsed: ChatStreamLine = serde_json::from_str(line)
        .map_err(|e| LmiError::StreamError(format!("{} ({})", line, e)))?;

    if let Some(error) = parsed.error {
        return Err(LmiError::ApiError(error));
    }

    Ok(Some(ChatLine {
        content: parsed.message.map(|m| m.content).unwrap_or_default(),
        done: parsed.done,
    }))
}

struct DecodeState<S> {
    bytes: Pin<Box<S>>,
    decoder: LineDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

/// Decode an NDJSON `/api/chat` body into reply fragments
///
/// Empty fragments are skipped. The stream ends at the `done` line, at end of
/// body, or right after the first error.
fn chat_fragments<S, E>(bytes: S) -> FragmentStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<LmiError> + Send + 'static,
{
    let state = DecodeState {
        bytes: Box::pin(bytes),
        decoder: LineDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.pending.pop_front() {
                match parse_chat_line(&line) {
                    Ok(Some(chat_line)) => {
                        if chat_line.done {
                            state.finished = true;
                            state.pending.clear();
                        }
                        if chat_line.content.is_empty() {
                            continue;
                        }
                        return Some((Ok(chat_line.content), state));
                    }
                    Ok(None) => continue,
                    Err(e) => {
                        state.finished = true;
                        state.pending.clear();
                        return Some((Err(e), state));
                    }
                }
            }

            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let lines = state.decoder.push(&chunk);
                    state.pending.extend(lines);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    state.finished = true;
                    if let Some(tail) = state.decoder.finish() {
                        state.pending.push_back(tail);
                    }
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use pretty_assertions::assert_eq;

    fn body(chunks: &[&'static str]) -> impl Stream<Item = Result<Bytes, LmiError>> + Send {
        stream::iter(
            chunks
                .iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    async fn collect(stream: FragmentStream) -> Vec<LmiResult<String>> {
        stream.collect().await
    }

    #[test]
    fn test_parse_chat_line() {
        let line = r#"{"model":"llama3","message":{"role":"assistant","content":"Hi"},"done":false}"#;
        assert_eq!(
            parse_chat_line(line).unwrap(),
            Some(ChatLine {
                content: "Hi".to_string(),
                done: false
            })
        );

        let last = r#"{"model":"llama3","message":{"role":"assistant","content":""},"done":true,"total_duration":1}"#;
        assert_eq!(
            parse_chat_line(last).unwrap(),
            Some(ChatLine {
                content: String::new(),
                done: true
            })
        );

        assert_eq!(parse_chat_line("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_chat_line_errors() {
        assert!(matches!(
            parse_chat_line(r#"{"error":"model 'nope' not found"}"#),
            Err(LmiError::ApiError(msg)) if msg.contains("nope")
        ));
        assert!(matches!(
            parse_chat_line("not json"),
            Err(LmiError::StreamError(_))
        ));
    }

    #[tokio::test]
    async fn test_fragments_survive_chunk_boundaries() {
        let stream = chat_fragments(body(&[
            r#"{"message":{"content":"Hel"},"done":false}"#,
            "\n{\"message\":{\"con",
            r#"tent":"lo"},"done":false}"#,
            "\n",
            r#"{"message":{"content":""},"done":true}"#,
            "\n",
        ]));

        let fragments: Vec<String> = collect(stream)
            .await
            .into_iter()
            .map(|f| f.unwrap())
            .collect();
        assert_eq!(fragments, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_fragments_stop_at_done() {
        let stream = chat_fragments(body(&[
            "{\"message\":{\"content\":\"end\"},\"done\":true}\n",
            "{\"message\":{\"content\":\"ignored\"},\"done\":false}\n",
        ]));

        let fragments: Vec<String> = collect(stream)
            .await
            .into_iter()
            .map(|f| f.unwrap())
            .collect();
        assert_eq!(fragments, vec!["end"]);
    }

    #[tokio::test]
    async fn test_fragments_without_trailing_newline() {
        let stream = chat_fragments(body(&["{\"message\":{\"content\":\"tail\"},\"done\":false}"]));

        let fragments: Vec<String> = collect(stream)
            .await
            .into_iter()
            .map(|f| f.unwrap())
            .collect();
        assert_eq!(fragments, vec!["tail"]);
    }

    #[tokio::test]
    async fn test_fragments_end_after_error() {
        let stream = chat_fragments(body(&[
            "{\"message\":{\"content\":\"a\"},\"done\":false}\n",
            "{\"error\":\"out of memory\"}\n",
            "{\"message\":{\"content\":\"b\"},\"done\":false}\n",
        ]));

        let items = collect(stream).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "a");
        assert!(matches!(&items[1], Err(LmiError::ApiError(msg)) if msg == "out of memory"));
    }

    #[test]
    fn test_chat_request_wire_format() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hello")];
        let request = ChatRequest {
            model: "llama3",
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            stream: true,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "model": "llama3",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hello"}
                ],
                "stream": true
            })
        );
    }

    #[test]
    fn test_tags_prefer_model_field() {
        let tags: TagsResponse = serde_json::from_str(
            r#"{"models":[{"name":"llama3:latest","model":"llama3:latest"},{"name":"mistral"}]}"#,
        )
        .unwrap();
        let names: Vec<String> = tags
            .models
            .into_iter()
            .filter_map(|m| m.model.or(m.name))
            .collect();
        assert_eq!(names, vec!["llama3:latest", "mistral"]);
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let backend = OllamaBackend::new("http://localhost:11434/").unwrap();
        assert_eq!(backend.base_url(), "http://localhost:11434");
        assert_eq!(backend.url("/api/tags"), "http://localhost:11434/api/tags");
    }

    #[test]
    fn test_new_rejects_unknown_scheme() {
        assert!(matches!(
            OllamaBackend::new("ftp://localhost:11434"),
            Err(LmiError::ConfigError(_))
        ));
    }
}
