use crate::config::LlmConfig;
use crate::{BrochureError, Result};
use futures::stream::Stream;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

/// A chat completion request in the OpenAI wire format.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

/// The `CompletionClient` struct talks to an OpenAI-compatible chat
/// completions endpoint. It supports plain completions, JSON-mode
/// completions for structured output, and token-incremental streaming.
pub struct CompletionClient {
    /// The HTTP client used for completion requests. No timeout is set
    /// beyond the client's defaults; streams run until exhausted.
    client: Client,
    /// The endpoint configuration (base URL, key, model tiers).
    config: LlmConfig,
}

impl CompletionClient {
    /// Creates a new `CompletionClient` with the given endpoint
    /// configuration.
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Sends one non-streaming completion request and returns the full
    /// response text.
    ///
    /// # Arguments
    ///
    /// * `system` - The system prompt.
    /// * `user` - The user prompt.
    /// * `model` - The model to use for this call.
    ///
    /// # Returns
    ///
    /// A `Result` containing the complete response text.
    pub async fn complete(&self, system: &str, user: &str, model: &str) -> Result<String> {
        let request = ChatRequest {
            model,
            messages: messages(system, user),
            response_format: None,
            stream: None,
        };

        self.complete_request(&request).await
    }

    /// Sends one completion request in JSON structured-output mode and
    /// returns the raw JSON text for the caller to parse against its schema.
    ///
    /// # Arguments
    ///
    /// * `system` - The system prompt.
    /// * `user` - The user prompt.
    /// * `model` - The model to use for this call.
    ///
    /// # Returns
    ///
    /// A `Result` containing the unparsed JSON response text.
    pub async fn complete_json(&self, system: &str, user: &str, model: &str) -> Result<String> {
        let request = ChatRequest {
            model,
            messages: messages(system, user),
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
            stream: None,
        };

        self.complete_request(&request).await
    }

    /// Sends one streaming completion request.
    ///
    /// # Arguments
    ///
    /// * `system` - The system prompt.
    /// * `user` - The user prompt.
    /// * `model` - The model to use for this call.
    ///
    /// # Returns
    ///
    /// A `Result` containing a finite, consume-once stream of text
    /// fragments in arrival order.
    pub async fn complete_stream(
        &self,
        system: &str,
        user: &str,
        model: &str,
    ) -> Result<CompletionStream> {
        let request = ChatRequest {
            model,
            messages: messages(system, user),
            response_format: None,
            stream: Some(true),
        };

        let response = self.send(&request).await?;
        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();

        Ok(CompletionStream::new(bytes))
    }

    async fn complete_request(&self, request: &ChatRequest<'_>) -> Result<String> {
        let response = self.send(request).await?;
        let parsed: ChatResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| BrochureError::CompletionError("empty completion response".to_string()))
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.config.api_base);
        debug!(model = request.model, stream = ?request.stream, "completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BrochureError::CompletionError(format!("{status}: {body}")));
        }

        Ok(response)
    }
}

fn messages<'a>(system: &'a str, user: &'a str) -> Vec<ChatMessage<'a>> {
    vec![
        ChatMessage {
            role: "system",
            content: system,
        },
        ChatMessage {
            role: "user",
            content: user,
        },
    ]
}

type ByteStream =
    Pin<Box<dyn Stream<Item = std::result::Result<Vec<u8>, reqwest::Error>> + Send>>;

/// The `CompletionStream` struct yields the text fragments of one streaming
/// completion, parsed from server-sent `data:` lines and terminated by the
/// `[DONE]` marker. The stream is finite, not restartable, and is consumed
/// exactly once.
pub struct CompletionStream {
    inner: ByteStream,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String>>,
    done: bool,
}

impl CompletionStream {
    fn new(inner: ByteStream) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Parses every complete line currently in the buffer, queueing decoded
    /// fragments. Partial lines stay buffered until more bytes arrive, so
    /// multi-byte characters split across network chunks are never broken.
    fn drain_buffer(&mut self) {
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let Some(payload) = line.trim().strip_prefix("data:") else {
                continue;
            };
            let payload = payload.trim_start();

            if payload == "[DONE]" {
                self.done = true;
                return;
            }

            match serde_json::from_str::<ChatChunk>(payload) {
                Ok(chunk) => {
                    let content = chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content);
                    if let Some(content) = content {
                        if !content.is_empty() {
                            self.pending.push_back(Ok(content));
                        }
                    }
                }
                Err(_) => {
                    self.pending.push_back(Err(BrochureError::CompletionError(
                        format!("malformed stream chunk: {payload}"),
                    )));
                    self.done = true;
                    return;
                }
            }
        }
    }
}

impl Stream for CompletionStream {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(fragment) = this.pending.pop_front() {
                return Poll::Ready(Some(fragment));
            }
            if this.done {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.buffer.extend_from_slice(&bytes);
                    this.drain_buffer();
                }
                Poll::Ready(Some(Err(error))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(error.into())));
                }
                Poll::Ready(None) => {
                    this.done = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn stream_of(chunks: Vec<&str>) -> CompletionStream {
        let items: Vec<std::result::Result<Vec<u8>, reqwest::Error>> = chunks
            .into_iter()
            .map(|chunk| Ok(chunk.as_bytes().to_vec()))
            .collect();
        CompletionStream::new(stream::iter(items).boxed())
    }

    /// Tests that fragments are decoded from `data:` lines in order and the
    /// stream ends at the `[DONE]` marker.
    #[tokio::test]
    async fn test_stream_decodes_fragments_in_order() {
        let mut stream = stream_of(vec![
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
        ]);

        let mut collected = String::new();
        while let Some(fragment) = stream.next().await {
            collected.push_str(&fragment.unwrap());
        }

        assert_eq!(collected, "Hello");
    }

    /// Tests that a `data:` line split across network chunks is reassembled
    /// before parsing.
    #[tokio::test]
    async fn test_stream_reassembles_split_lines() {
        let mut stream = stream_of(vec![
            "data: {\"choices\":[{\"delta\":",
            "{\"content\":\"token\"}}]}\n\ndata: [DONE]\n\n",
        ]);

        let fragment = stream.next().await.unwrap().unwrap();
        assert_eq!(fragment, "token");
        assert!(stream.next().await.is_none());
    }

    /// Tests that chunks without a delta payload (role-only or usage
    /// chunks) are skipped rather than yielded as empty fragments.
    #[tokio::test]
    async fn test_stream_skips_empty_deltas() {
        let mut stream = stream_of(vec![
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"only\"}}]}\n\n",
            "data: [DONE]\n\n",
        ]);

        assert_eq!(stream.next().await.unwrap().unwrap(), "only");
        assert!(stream.next().await.is_none());
    }

    /// Tests that a malformed chunk surfaces as a completion error and
    /// terminates the stream.
    #[tokio::test]
    async fn test_stream_malformed_chunk_errors() {
        let mut stream = stream_of(vec!["data: {not json}\n\n"]);

        let result = stream.next().await.unwrap();
        assert!(matches!(result, Err(BrochureError::CompletionError(_))));
        assert!(stream.next().await.is_none());
    }
}
