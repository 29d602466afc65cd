//! Turns raw chat replies into bounded, fully populated results.
//!
//! Nothing here returns an error. A reply that cannot be used, or a call
//! that never produced one, is replaced by the matching fallback from
//! [`crate::fallback`].

use crate::chat::ChatFailure;
use crate::fallback::{
    fallback_evaluation, fallback_photo_analysis, fallback_progress_insight,
    FailureMode,
};
use crate::skin::{
    AnalyzedMetric, EvaluationRequest, EvaluationResult, PhotoAvailability,
    ProgressAnalysis, Trend, Verdict,
};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const DEFAULT_FIT_SCORE: u8 = 50;
pub const DEFAULT_VERDICT: Verdict = Verdict::Good;
pub const DEFAULT_RECOMMENDATION: &str =
    "Patch test this product before adding it to your routine";
pub const DEFAULT_METRIC_LABEL: &str = "Skin metric";
pub const DEFAULT_METRIC_VALUE: f64 = 50.0;
pub const DEFAULT_PHOTO_INSIGHT: &str =
    "Keep taking progress photos in consistent lighting to track changes.";

static EMBEDDED_OBJECT: OnceLock<Regex> = OnceLock::new();

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightSource {
    Ai,
    Fallback(FailureMode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpreted<T> {
    pub value: T,
    pub source: InsightSource,
}

impl<T> Interpreted<T> {
    fn ai(value: T) -> Self {
        Self {
            value,
            source: InsightSource::Ai,
        }
    }

    fn fallback(value: T, mode: FailureMode) -> Self {
        Self {
            value,
            source: InsightSource::Fallback(mode),
        }
    }
}

fn embedded_object_pattern() -> &'static Regex {
    // Greedy: spans from the first '{' to the last '}'.
    EMBEDDED_OBJECT.get_or_init(|| {
        Regex::new(r"(?s)\{.*\}").expect("embedded object pattern is valid")
    })
}

/// Locates the outermost `{...}` span in free-form text and parses it as
/// a JSON object.
pub fn extract_embedded_object(text: &str) -> Option<Map<String, Value>> {
    let candidate = embedded_object_pattern().find(text)?;
    match serde_json::from_str::<Value>(candidate.as_str()) {
        Ok(Value::Object(object)) => Some(object),
        Ok(_) => None,
        Err(error) => {
            warn!(%error, "Failed to parse embedded JSON object");
            None
        }
    }
}

fn bounded_score(value: Option<&Value>, default: u8) -> u8 {
    value
        .and_then(Value::as_f64)
        .filter(|score| score.is_finite())
        .map(|score| score.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(default)
}

fn bounded_value(value: Option<&Value>, default: f64) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
        .map(|value| value.clamp(0.0, 100.0))
        .unwrap_or(default)
}

fn non_blank_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(String::from)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| non_blank_string(Some(item)))
                .collect()
        })
        .unwrap_or_default()
}

fn analyzed_metric(value: &Value) -> Option<AnalyzedMetric> {
    let object = value.as_object()?;
    let trend = object
        .get("trend")
        .and_then(Value::as_str)
        .and_then(Trend::parse)
        .unwrap_or(Trend::Neutral);
    Some(AnalyzedMetric {
        label: non_blank_string(object.get("label"))
            .unwrap_or_else(|| DEFAULT_METRIC_LABEL.to_string()),
        value: bounded_value(object.get("value"), DEFAULT_METRIC_VALUE),
        trend,
        is_good: object
            .get("isGood")
            .and_then(Value::as_bool)
            .unwrap_or(trend != Trend::Down),
    })
}

pub fn interpret_evaluation(
    reply: &Result<String, ChatFailure>,
    request: &EvaluationRequest,
) -> Interpreted<EvaluationResult> {
    let text = match reply {
        Ok(text) => text,
        Err(failure) => {
            warn!(%failure, product = %request.product_name, "Using service failure fallback for evaluation");
            return Interpreted::fallback(
                fallback_evaluation(request, FailureMode::ServiceFailure),
                FailureMode::ServiceFailure,
            );
        }
    };

    debug!(raw_response = %text, "Interpreting evaluation response");
    let Some(object) = extract_embedded_object(text) else {
        warn!(product = %request.product_name, "No usable JSON in evaluation response");
        return Interpreted::fallback(
            fallback_evaluation(request, FailureMode::Unparseable),
            FailureMode::Unparseable,
        );
    };

    Interpreted::ai(EvaluationResult {
        fit_score: bounded_score(object.get("fitScore"), DEFAULT_FIT_SCORE),
        verdict: object
            .get("verdict")
            .and_then(Value::as_str)
            .and_then(Verdict::parse)
            .unwrap_or(DEFAULT_VERDICT),
        insights: string_list(object.get("insights")),
        recommendation: non_blank_string(object.get("recommendation"))
            .unwrap_or_else(|| DEFAULT_RECOMMENDATION.to_string()),
    })
}

/// Accepts either `{"insight": "..."}` or a plain prose reply.
pub fn interpret_progress_insight(
    reply: &Result<String, ChatFailure>,
    days_tracked: u32,
) -> Interpreted<String> {
    let text = match reply {
        Ok(text) => text,
        Err(failure) => {
            warn!(%failure, "Using service failure fallback for progress insight");
            return Interpreted::fallback(
                fallback_progress_insight(
                    days_tracked,
                    FailureMode::ServiceFailure,
                ),
                FailureMode::ServiceFailure,
            );
        }
    };

    debug!(raw_response = %text, "Interpreting progress insight response");
    if let Some(insight) = extract_embedded_object(text)
        .and_then(|object| non_blank_string(object.get("insight")))
    {
        return Interpreted::ai(insight);
    }

    let prose = text.trim();
    if prose.is_empty() || embedded_object_pattern().is_match(prose) {
        warn!("No usable insight in progress response");
        return Interpreted::fallback(
            fallback_progress_insight(days_tracked, FailureMode::Unparseable),
            FailureMode::Unparseable,
        );
    }
    Interpreted::ai(prose.to_string())
}

pub fn interpret_photo_analysis(
    reply: &Result<String, ChatFailure>,
    current: &PhotoAvailability,
) -> Interpreted<ProgressAnalysis> {
    let text = match reply {
        Ok(text) => text,
        Err(failure) => {
            warn!(%failure, "Using service failure fallback for photo analysis");
            return Interpreted::fallback(
                fallback_photo_analysis(current, FailureMode::ServiceFailure),
                FailureMode::ServiceFailure,
            );
        }
    };

    debug!(raw_response = %text, "Interpreting photo analysis response");
    let Some(object) = extract_embedded_object(text) else {
        warn!("No usable JSON in photo analysis response");
        return Interpreted::fallback(
            fallback_photo_analysis(current, FailureMode::Unparseable),
            FailureMode::Unparseable,
        );
    };

    let metrics = object
        .get("metrics")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(analyzed_metric).collect())
        .unwrap_or_default();

    Interpreted::ai(ProgressAnalysis {
        metrics,
        insight: non_blank_string(object.get("insight"))
            .unwrap_or_else(|| DEFAULT_PHOTO_INSIGHT.to_string()),
    })
}
