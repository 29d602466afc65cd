pub mod fake;
pub mod real;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

/// A finite, non-restartable sequence of text chunks from a streamed reply.
pub type ChatStream = BoxStream<'static, Result<String>>;

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub model: String,
    pub stream: bool,
}

/// A struct to record what was sent to the chat service
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model_name: String,
    pub prompt: String,
    pub stream: bool,
}

/// Why a chat call produced no reply text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatFailure {
    ServiceUnavailable,
    CallFailure(String),
    TimedOut { secs: u64 },
}

impl std::fmt::Display for ChatFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ChatFailure::ServiceUnavailable => {
                write!(f, "Chat service not available")
            }
            ChatFailure::CallFailure(msg) => {
                write!(f, "Chat call failed: {}", msg)
            }
            ChatFailure::TimedOut { secs } => {
                write!(f, "Chat call timed out after {}s", secs)
            }
        }
    }
}

impl std::error::Error for ChatFailure {}

/// A trait that abstracts the hosted chat capability
///
/// Both the real client and the scripted fake implement this, so the
/// insight service never depends on a concrete provider.
#[async_trait]
pub trait ChatClientTrait: Send + Sync {
    /// Whether the capability is loaded and usable.
    ///
    /// Queried once per insight request before any call is made.
    fn is_available(&self) -> bool {
        true
    }

    /// Sends a single prompt and returns the complete reply text
    async fn chat(&self, prompt: &str, options: &ChatOptions) -> Result<String>;

    /// Sends a single prompt and returns the reply as a stream of chunks
    async fn chat_stream(
        &self,
        prompt: &str,
        options: &ChatOptions,
    ) -> Result<ChatStream>;
}

/// Concatenates every chunk. The first chunk error aborts the collection.
pub async fn collect_stream(mut stream: ChatStream) -> Result<String> {
    let mut content = String::new();
    while let Some(chunk) = stream.next().await {
        content.push_str(&chunk?);
    }
    Ok(content)
}
