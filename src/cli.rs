use clap::Parser;

/// Command-line arguments for the insight server
#[derive(Parser, Debug, Clone)]
#[command(version, about = "Skincare insight service")]
pub struct ServerArgs {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 3010)]
    pub port: u16,

    /// API key for the chat completions endpoint
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible chat completions endpoint
    #[arg(long, env = "OPENAI_API_BASE")]
    pub openai_api_base: Option<String>,

    /// Model used for every insight request
    #[arg(long, env = "CHAT_MODEL", default_value = "claude-sonnet-4")]
    pub chat_model: String,

    /// Deadline for a single chat call, in seconds
    #[arg(long, default_value_t = 30)]
    pub chat_timeout_secs: u64,

    /// Request streamed replies and concatenate the chunks
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    pub stream_responses: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = ServerArgs::try_parse_from(["skinsight_server"]).unwrap();
        assert_eq!(args.port, 3010);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.chat_timeout_secs, 30);
        assert!(!args.stream_responses);
    }

    #[test]
    fn test_overrides() {
        let args = ServerArgs::try_parse_from([
            "skinsight_server",
            "--port",
            "8080",
            "--chat-model",
            "gpt-4o-mini",
            "--stream-responses",
            "true",
        ])
        .unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.chat_model, "gpt-4o-mini");
        assert!(args.stream_responses);
    }
}
