use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures_util::stream;
use futures_util::StreamExt;
use std::sync::Mutex;
use std::time::Duration;

use crate::chat::{ChatClientTrait, ChatOptions, ChatRequest, ChatStream};

/// A scripted reply for the fake client.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    Chunks(Vec<String>),
    /// Yields the chunks, then fails mid-stream.
    BrokenStream(Vec<String>, String),
    Failure(String),
}

/// A fake implementation of the chat client for testing
///
/// Replies are handed out in the order they were configured. Once the
/// script runs out, a fixed prose reply with no JSON is returned. Every
/// call is recorded in `requests` for later verification.
///
/// # Example
///
/// ```
/// use skinsight::chat::{ChatClientTrait, ChatOptions};
/// use skinsight::chat::fake::FakeChatClient;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = FakeChatClient::new()
///         .with_response(r#"{"fitScore": 90}"#);
///
///     let options = ChatOptions {
///         model: "claude-sonnet-4".to_string(),
///         stream: false,
///     };
///     let reply = client.chat("Evaluate this serum", &options).await?;
///
///     assert_eq!(reply, r#"{"fitScore": 90}"#);
///     Ok(())
/// }
/// ```
pub struct FakeChatClient {
    replies: Mutex<Vec<FakeReply>>,
    available: bool,
    delay: Option<Duration>,
    // Track requests for verification in tests
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl Default for FakeChatClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeChatClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(vec![]),
            available: true,
            delay: None,
            requests: Mutex::new(vec![]),
        }
    }

    /// Add a complete text reply
    pub fn with_response(self, response: &str) -> Self {
        self.with_reply(FakeReply::Text(response.to_string()))
    }

    /// Add multiple text replies to be returned in sequence
    pub fn with_responses(self, responses: Vec<&str>) -> Self {
        responses
            .into_iter()
            .fold(self, |client, response| client.with_response(response))
    }

    /// Add a reply delivered as separate chunks
    pub fn with_chunks(self, chunks: Vec<&str>) -> Self {
        self.with_reply(FakeReply::Chunks(
            chunks.into_iter().map(String::from).collect(),
        ))
    }

    /// Make the next call fail with the given message
    pub fn with_failure(self, message: &str) -> Self {
        self.with_reply(FakeReply::Failure(message.to_string()))
    }

    pub fn with_reply(self, reply: FakeReply) -> Self {
        self.replies.lock().expect("replies lock").push(reply);
        self
    }

    /// Report the capability as not loaded
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Sleep before answering, for deadline tests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn next_reply(&self, prompt: &str, options: &ChatOptions) -> FakeReply {
        self.requests.lock().expect("requests lock").push(ChatRequest {
            model_name: options.model.clone(),
            prompt: prompt.to_string(),
            stream: options.stream,
        });

        let mut replies = self.replies.lock().expect("replies lock");
        if replies.is_empty() {
            FakeReply::Text("Fake default response".to_string())
        } else {
            replies.remove(0)
        }
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ChatClientTrait for FakeChatClient {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<String> {
        let reply = self.next_reply(prompt, options);
        self.wait().await;
        match reply {
            FakeReply::Text(text) => Ok(text),
            FakeReply::Chunks(chunks) => Ok(chunks.concat()),
            FakeReply::BrokenStream(_, message) | FakeReply::Failure(message) => {
                Err(anyhow!(message))
            }
        }
    }

    async fn chat_stream(
        &self,
        prompt: &str,
        options: &ChatOptions,
    ) -> Result<ChatStream> {
        let reply = self.next_reply(prompt, options);
        self.wait().await;
        let items: Vec<Result<String>> = match reply {
            FakeReply::Text(text) => vec![Ok(text)],
            FakeReply::Chunks(chunks) => chunks.into_iter().map(Ok).collect(),
            FakeReply::BrokenStream(chunks, message) => chunks
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(anyhow!(message))))
                .collect(),
            FakeReply::Failure(message) => return Err(anyhow!(message)),
        };
        Ok(stream::iter(items).boxed())
    }
}
