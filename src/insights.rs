use crate::chat::{
    collect_stream, ChatClientTrait, ChatFailure, ChatOptions,
};
use crate::interpret::{
    interpret_evaluation, interpret_photo_analysis,
    interpret_progress_insight, Interpreted,
};
use crate::prompts::{
    build_evaluation_prompt, build_photo_analysis_prompt,
    build_progress_insight_prompt,
};
use crate::skin::{
    EvaluationRequest, EvaluationResult, PhotoAnalysisRequest,
    ProgressAnalysis, ProgressInsightRequest,
};
use crate::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct InsightSettings {
    pub model: String,
    pub call_timeout: Duration,
    pub stream: bool,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4".to_string(),
            call_timeout: Duration::from_secs(30),
            stream: false,
        }
    }
}

async fn call_chat(
    client: &dyn ChatClientTrait,
    prompt: &str,
    options: &ChatOptions,
) -> anyhow::Result<String> {
    if options.stream {
        let stream = client.chat_stream(prompt, options).await?;
        collect_stream(stream).await
    } else {
        client.chat(prompt, options).await
    }
}

/// Runs one chat call under the configured deadline.
///
/// A missing or unavailable client, a failed call, and an expired deadline
/// all come back as a [`ChatFailure`].
#[instrument(skip(client, prompt), fields(model = %settings.model, stream = settings.stream))]
pub async fn request_completion(
    client: Option<Arc<dyn ChatClientTrait>>,
    settings: &InsightSettings,
    prompt: &str,
) -> Result<String, ChatFailure> {
    let client = match client {
        Some(client) if client.is_available() => client,
        _ => {
            warn!("Chat service is not available");
            return Err(ChatFailure::ServiceUnavailable);
        }
    };

    let options = ChatOptions {
        model: settings.model.clone(),
        stream: settings.stream,
    };
    let call = call_chat(client.as_ref(), prompt, &options);

    let start_time = std::time::Instant::now();
    match tokio::time::timeout(settings.call_timeout, call).await {
        Ok(Ok(text)) => {
            info!(
                duration_ms = start_time.elapsed().as_millis() as u64,
                "Chat reply received"
            );
            Ok(text)
        }
        Ok(Err(e)) => {
            error!("Chat call failed: {:#}", e);
            Err(ChatFailure::CallFailure(e.to_string()))
        }
        Err(_) => {
            error!(
                "Chat call exceeded deadline of {:?}",
                settings.call_timeout
            );
            Err(ChatFailure::TimedOut {
                secs: settings.call_timeout.as_secs(),
            })
        }
    }
}

pub async fn evaluate_product_with_client(
    client: Option<Arc<dyn ChatClientTrait>>,
    settings: &InsightSettings,
    request: &EvaluationRequest,
) -> Interpreted<EvaluationResult> {
    let prompt = build_evaluation_prompt(request);
    let reply = request_completion(client, settings, &prompt).await;
    interpret_evaluation(&reply, request)
}

pub async fn analyze_progress_with_client(
    client: Option<Arc<dyn ChatClientTrait>>,
    settings: &InsightSettings,
    request: &ProgressInsightRequest,
) -> Interpreted<String> {
    let prompt =
        build_progress_insight_prompt(&request.metrics, request.days_tracked);
    let reply = request_completion(client, settings, &prompt).await;
    interpret_progress_insight(&reply, request.days_tracked)
}

pub async fn analyze_photos_with_client(
    client: Option<Arc<dyn ChatClientTrait>>,
    settings: &InsightSettings,
    request: &PhotoAnalysisRequest,
) -> Interpreted<ProgressAnalysis> {
    let prompt =
        build_photo_analysis_prompt(&request.current, request.previous.as_ref());
    let reply = request_completion(client, settings, &prompt).await;
    interpret_photo_analysis(&reply, &request.current)
}

#[instrument(skip(state, request), fields(product = %request.product_name))]
pub async fn evaluate_product(
    state: &Arc<AppState>,
    request: EvaluationRequest,
) -> EvaluationResult {
    let interpreted = evaluate_product_with_client(
        state.chat_client.clone(),
        &state.insight_settings,
        &request,
    )
    .await;
    state.stats.record(interpreted.source);
    interpreted.value
}

#[instrument(skip(state, request), fields(days_tracked = request.days_tracked))]
pub async fn analyze_progress(
    state: &Arc<AppState>,
    request: ProgressInsightRequest,
) -> String {
    let interpreted = analyze_progress_with_client(
        state.chat_client.clone(),
        &state.insight_settings,
        &request,
    )
    .await;
    state.stats.record(interpreted.source);
    interpreted.value
}

#[instrument(skip(state, request))]
pub async fn analyze_photos(
    state: &Arc<AppState>,
    request: PhotoAnalysisRequest,
) -> ProgressAnalysis {
    let interpreted = analyze_photos_with_client(
        state.chat_client.clone(),
        &state.insight_settings,
        &request,
    )
    .await;
    state.stats.record(interpreted.source);
    interpreted.value
}
