use crate::chat::{real::maybe_create_chat_client, ChatClientTrait};
use crate::fallback::FailureMode;
use crate::insights::InsightSettings;
use crate::interpret::InsightSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub mod app;
pub mod chat;
pub mod cli;
pub mod fallback;
pub mod insights;
pub mod interpret;
pub mod prompts;
pub mod skin;

pub mod test_utils;

// Outcome counters for every insight request served
#[derive(Debug)]
pub struct ServiceStats {
    pub request_count: AtomicU64,
    pub ai_count: AtomicU64,
    pub unparseable_fallback_count: AtomicU64,
    pub service_failure_fallback_count: AtomicU64,
}

impl Default for ServiceStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceStats {
    pub fn new() -> Self {
        Self {
            request_count: AtomicU64::new(0),
            ai_count: AtomicU64::new(0),
            unparseable_fallback_count: AtomicU64::new(0),
            service_failure_fallback_count: AtomicU64::new(0),
        }
    }

    pub fn record(&self, source: InsightSource) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        let counter = match source {
            InsightSource::Ai => &self.ai_count,
            InsightSource::Fallback(FailureMode::Unparseable) => {
                &self.unparseable_fallback_count
            }
            InsightSource::Fallback(FailureMode::ServiceFailure) => {
                &self.service_failure_fallback_count
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct AppState {
    // None runs the service in fallback-only mode.
    pub chat_client: Option<Arc<dyn ChatClientTrait>>,
    pub insight_settings: InsightSettings,
    pub stats: ServiceStats,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub shutdown_token: CancellationToken,
}

impl AppState {
    pub fn new_for_testing() -> Self {
        Self::new_for_testing_with_client(None)
    }

    pub fn new_for_testing_with_client(
        chat_client: Option<Arc<dyn ChatClientTrait>>,
    ) -> Self {
        Self {
            chat_client,
            insight_settings: InsightSettings {
                model: "test-model".to_string(),
                call_timeout: Duration::from_secs(5),
                stream: false,
            },
            stats: ServiceStats::new(),
            started_at: chrono::Utc::now(),
            shutdown_token: CancellationToken::new(),
        }
    }
}

pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_api_base: Option<String>,
    pub chat_model: String,
    pub chat_timeout_secs: u64,
    pub stream_responses: bool,
}

// Function to create AppState from parameters
pub fn create_app_state(config: AppConfig) -> Arc<AppState> {
    let chat_client = match maybe_create_chat_client(
        config.openai_api_key,
        config.openai_api_base,
    ) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Failed to create chat client, serving fallbacks only: {}", e);
            None
        }
    };

    info!(
        model = %config.chat_model,
        timeout_secs = config.chat_timeout_secs,
        stream = config.stream_responses,
        "Configured insight service"
    );

    Arc::new(AppState {
        chat_client,
        insight_settings: InsightSettings {
            model: config.chat_model,
            call_timeout: Duration::from_secs(config.chat_timeout_secs.max(1)),
            stream: config.stream_responses,
        },
        stats: ServiceStats::new(),
        started_at: chrono::Utc::now(),
        shutdown_token: CancellationToken::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> AppConfig {
        AppConfig {
            openai_api_key: api_key.map(String::from),
            openai_api_base: None,
            chat_model: "claude-sonnet-4".to_string(),
            chat_timeout_secs: 0,
            stream_responses: true,
        }
    }

    #[test]
    fn create_app_state_without_key_runs_fallback_only() {
        let state = create_app_state(config(None));
        assert!(state.chat_client.is_none());
        assert_eq!(state.insight_settings.model, "claude-sonnet-4");
        assert!(state.insight_settings.stream);
        // Zero would expire every call immediately.
        assert_eq!(state.insight_settings.call_timeout, Duration::from_secs(1));
    }

    #[test]
    fn create_app_state_with_key_builds_client() {
        let state = create_app_state(config(Some("sk-test")));
        assert!(state.chat_client.is_some());
    }

    #[test]
    fn stats_record_each_outcome() {
        let stats = ServiceStats::new();
        stats.record(InsightSource::Ai);
        stats.record(InsightSource::Fallback(FailureMode::Unparseable));
        stats.record(InsightSource::Fallback(FailureMode::ServiceFailure));
        stats.record(InsightSource::Fallback(FailureMode::ServiceFailure));

        assert_eq!(stats.request_count.load(Ordering::Relaxed), 4);
        assert_eq!(stats.ai_count.load(Ordering::Relaxed), 1);
        assert_eq!(stats.unparseable_fallback_count.load(Ordering::Relaxed), 1);
        assert_eq!(
            stats.service_failure_fallback_count.load(Ordering::Relaxed),
            2
        );
    }
}
