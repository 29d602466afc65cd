//! Static insights used whenever the chat service cannot produce a usable
//! answer.
//!
//! Two failure modes are kept apart. `Unparseable` means the service
//! answered but nothing usable could be extracted. `ServiceFailure` means
//! no answer arrived at all (not configured, call error, deadline). The
//! second is scored more conservatively so the two stay distinguishable.

use crate::skin::{
    AnalyzedMetric, EvaluationRequest, EvaluationResult, PhotoAvailability,
    ProgressAnalysis, SkinGoal, SkinType, Trend, Verdict,
};

pub const UNPARSEABLE_FIT_SCORE: u8 = 75;
pub const SERVICE_FAILURE_FIT_SCORE: u8 = 60;

const UNPARSEABLE_METRIC_VALUE: f64 = 70.0;
const SERVICE_FAILURE_METRIC_VALUE: f64 = 50.0;

pub const BASELINE_METRIC_LABELS: [&str; 4] =
    ["Hydration", "Clarity", "Texture", "Radiance"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// The service replied but the reply held no usable JSON.
    Unparseable,
    /// The service was unavailable, failed, or timed out.
    ServiceFailure,
}

impl FailureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureMode::Unparseable => "unparseable",
            FailureMode::ServiceFailure => "service_failure",
        }
    }
}

#[derive(Debug)]
pub struct SkinTypeEntry {
    pub insights: &'static [&'static str],
    pub recommendation: &'static str,
}

const OILY: SkinTypeEntry = SkinTypeEntry {
    insights: &[
        "Lightweight, non-comedogenic formulas suit oily skin best",
        "Niacinamide can help regulate excess sebum",
        "Heavy oils and occlusive butters may clog pores",
    ],
    recommendation: "Apply a thin layer and follow with an oil-free moisturizer",
};

const DRY: SkinTypeEntry = SkinTypeEntry {
    insights: &[
        "Humectants like hyaluronic acid and glycerin draw moisture into dry skin",
        "Ceramides support a weakened moisture barrier",
        "Fragrance and drying alcohols can make flaking worse",
    ],
    recommendation:
        "Apply to slightly damp skin and seal it in with a rich moisturizer",
};

const COMBINATION: SkinTypeEntry = SkinTypeEntry {
    insights: &[
        "Combination skin often needs different care for the T-zone and cheeks",
        "Gel and lotion textures hydrate without adding shine",
        "Richer products work best applied only where skin feels tight",
    ],
    recommendation:
        "Focus this product where your skin needs it most and keep layers light on the T-zone",
};

const SENSITIVE: SkinTypeEntry = SkinTypeEntry {
    insights: &[
        "Sensitive skin does best with short, fragrance-free ingredient lists",
        "Centella and colloidal oat can calm irritation",
        "New actives should be introduced slowly to avoid flare-ups",
    ],
    recommendation:
        "Patch test on your inner arm for 48 hours before applying to your face",
};

const NORMAL: SkinTypeEntry = SkinTypeEntry {
    insights: &[
        "Normal skin tolerates most formulations well",
        "A consistent routine keeps your barrier healthy",
        "Antioxidants help preserve your skin's natural balance",
    ],
    recommendation:
        "Use this product consistently as part of a simple morning and evening routine",
};

const DEFAULT_ENTRY: SkinTypeEntry = SkinTypeEntry {
    insights: &[
        "Every skin responds differently, so introduce new products one at a time",
        "Check the ingredient list for known irritants before use",
        "Several weeks of consistent use give the clearest picture of results",
    ],
    recommendation:
        "Patch test this product first and track how your skin responds over the next two weeks",
};

pub fn skin_type_entry(skin_type: Option<SkinType>) -> &'static SkinTypeEntry {
    match skin_type {
        Some(SkinType::Oily) => &OILY,
        Some(SkinType::Dry) => &DRY,
        Some(SkinType::Combination) => &COMBINATION,
        Some(SkinType::Sensitive) => &SENSITIVE,
        Some(SkinType::Normal) => &NORMAL,
        None => &DEFAULT_ENTRY,
    }
}

pub fn goal_fragment(goal: SkinGoal) -> &'static str {
    match goal {
        SkinGoal::Acne => "Pair it with salicylic acid to keep breakouts in check",
        SkinGoal::Glow => "Add a vitamin C serum in the morning for extra radiance",
        SkinGoal::Hydrate => "Layer a hyaluronic acid serum underneath for deeper hydration",
        SkinGoal::Protect => "Finish with broad-spectrum SPF 30 or higher every day",
    }
}

/// `"<recommendation>. <fragment> <fragment>."` when goals are present,
/// the bare recommendation otherwise.
pub fn fallback_recommendation(
    skin_type: Option<SkinType>,
    goals: &[SkinGoal],
) -> String {
    let recommendation = skin_type_entry(skin_type).recommendation;
    if goals.is_empty() {
        return recommendation.to_string();
    }
    let fragments = goals
        .iter()
        .map(|goal| goal_fragment(*goal))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{recommendation}. {fragments}.")
}

pub fn fallback_evaluation(
    request: &EvaluationRequest,
    mode: FailureMode,
) -> EvaluationResult {
    let entry = skin_type_entry(request.skin_type);
    let (fit_score, verdict) = match mode {
        FailureMode::Unparseable => (UNPARSEABLE_FIT_SCORE, Verdict::Good),
        FailureMode::ServiceFailure => {
            (SERVICE_FAILURE_FIT_SCORE, Verdict::Caution)
        }
    };
    EvaluationResult {
        fit_score,
        verdict,
        insights: entry.insights.iter().map(|s| s.to_string()).collect(),
        recommendation: fallback_recommendation(
            request.skin_type,
            &request.goals,
        ),
    }
}

pub fn fallback_progress_insight(days_tracked: u32, mode: FailureMode) -> String {
    match mode {
        FailureMode::ServiceFailure => {
            "Personalized insights are unavailable right now. Keep logging your check-ins and check back later for a fresh analysis."
                .to_string()
        }
        FailureMode::Unparseable => match days_tracked {
            0 => "Start logging daily check-ins to see how your skin responds over time."
                .to_string(),
            1 => "You've tracked your skin for 1 day. Keep logging for at least a week to spot reliable trends."
                .to_string(),
            2..=6 => format!(
                "You've tracked your skin for {days_tracked} days. Keep logging for at least a week to spot reliable trends."
            ),
            _ => format!(
                "After {days_tracked} days of tracking, consistency matters most. Keep your routine steady and watch for gradual changes."
            ),
        },
    }
}

pub fn fallback_photo_analysis(
    current: &PhotoAvailability,
    mode: FailureMode,
) -> ProgressAnalysis {
    let value = match mode {
        FailureMode::Unparseable => UNPARSEABLE_METRIC_VALUE,
        FailureMode::ServiceFailure => SERVICE_FAILURE_METRIC_VALUE,
    };
    let metrics = BASELINE_METRIC_LABELS
        .iter()
        .map(|label| AnalyzedMetric {
            label: label.to_string(),
            value,
            trend: Trend::Neutral,
            is_good: true,
        })
        .collect();

    let insight = if !current.any() {
        "Add a front-facing progress photo so changes in your skin can be compared over time."
            .to_string()
    } else {
        match mode {
            FailureMode::Unparseable => {
                "Your photos are saved. Keep taking them in the same lighting to make changes easier to see."
                    .to_string()
            }
            FailureMode::ServiceFailure => {
                "We could not reach the photo analysis service. Your photos are saved and can be analyzed later."
                    .to_string()
            }
        }
    };

    ProgressAnalysis { metrics, insight }
}
