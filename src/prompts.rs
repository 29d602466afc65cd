use crate::fallback::BASELINE_METRIC_LABELS;
use crate::skin::{
    EvaluationRequest, PhotoAvailability, ProgressMetric, SkinGoal, Trend,
    Verdict,
};

const EXPERT_FRAMING: &str = "You are a board-certified dermatologist and cosmetic chemist. Give practical, evidence-based skincare guidance in plain language. Do not diagnose medical conditions.";

const JSON_ONLY: &str =
    "Respond with only a JSON object in exactly this shape, with no markdown and no extra prose:";

fn quoted_choices(values: &[&str]) -> String {
    values
        .iter()
        .map(|value| format!("\"{}\"", value))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn verdict_choices() -> String {
    quoted_choices(&Verdict::ALL.map(|verdict| verdict.as_str()))
}

fn trend_choices() -> String {
    quoted_choices(&Trend::ALL.map(|trend| trend.as_str()))
}

fn goal_list(goals: &[SkinGoal]) -> String {
    goals
        .iter()
        .map(|goal| goal.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn build_evaluation_prompt(request: &EvaluationRequest) -> String {
    let mut lines = vec![
        EXPERT_FRAMING.to_string(),
        String::new(),
        "Evaluate how well this skincare product fits the person described below.".to_string(),
        format!("Product: {}", request.product_name.trim()),
    ];
    if let Some(skin_type) = request.skin_type {
        lines.push(format!("Skin type: {}", skin_type.as_str()));
    }
    if !request.goals.is_empty() {
        lines.push(format!("Skin goals: {}", goal_list(&request.goals)));
    }

    lines.push(String::new());
    lines.push(JSON_ONLY.to_string());
    lines.push(format!(
        r#"{{
  "fitScore": <integer from 0 to 100>,
  "verdict": {},
  "insights": ["<short insight about an ingredient or property>", "..."],
  "recommendation": "<one or two sentences on how to use the product>"
}}"#,
        verdict_choices()
    ));
    lines.push(
        "Give 2 to 4 insights. Use \"caution\" when an ingredient is likely to irritate this skin type."
            .to_string(),
    );
    lines.join("\n")
}

pub fn build_progress_insight_prompt(
    metrics: &[ProgressMetric],
    days_tracked: u32,
) -> String {
    let mut lines = vec![
        EXPERT_FRAMING.to_string(),
        String::new(),
        "Review this person's skin tracking progress and write an encouraging, specific insight."
            .to_string(),
        format!("Days tracked: {}", days_tracked),
    ];
    if !metrics.is_empty() {
        lines.push("Current metrics (0 to 100):".to_string());
        for metric in metrics {
            lines.push(format!(
                "- {}: {:.0} (trending {})",
                metric.label.trim(),
                metric.value,
                metric.trend.as_str()
            ));
        }
    }

    lines.push(String::new());
    lines.push(JSON_ONLY.to_string());
    lines.push(
        r#"{
  "insight": "<2 to 3 sentences, at most 60 words>"
}"#
        .to_string(),
    );
    lines.join("\n")
}

pub fn build_photo_analysis_prompt(
    current: &PhotoAvailability,
    previous: Option<&PhotoAvailability>,
) -> String {
    let mut lines = vec![
        EXPERT_FRAMING.to_string(),
        String::new(),
        "Analyze this person's skin progress photos and score each skin metric."
            .to_string(),
    ];
    let current_angles = current.available_angles();
    if !current_angles.is_empty() {
        lines.push(format!(
            "Current photos available: {}",
            current_angles.join(", ")
        ));
    }
    if let Some(previous) = previous.filter(|previous| previous.any()) {
        lines.push(format!(
            "Previous photos available for comparison: {}",
            previous.available_angles().join(", ")
        ));
    }

    lines.push(String::new());
    lines.push(JSON_ONLY.to_string());
    lines.push(format!(
        r#"{{
  "metrics": [
    {{
      "label": {},
      "value": <number from 0 to 100>,
      "trend": {},
      "isGood": <true | false>
    }}
  ],
  "insight": "<one or two sentences summarizing visible change>"
}}"#,
        quoted_choices(&BASELINE_METRIC_LABELS),
        trend_choices()
    ));
    lines.push(
        "Include one entry per label. Use \"neutral\" when there is nothing to compare against."
            .to_string(),
    );
    lines.join("\n")
}
