use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinType {
    Oily,
    Dry,
    Combination,
    Sensitive,
    Normal,
}

impl SkinType {
    pub const ALL: [SkinType; 5] = [
        SkinType::Oily,
        SkinType::Dry,
        SkinType::Combination,
        SkinType::Sensitive,
        SkinType::Normal,
    ];

    /// Returns None for anything outside the known skin types.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "oily" => Some(SkinType::Oily),
            "dry" => Some(SkinType::Dry),
            "combination" => Some(SkinType::Combination),
            "sensitive" => Some(SkinType::Sensitive),
            "normal" => Some(SkinType::Normal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkinType::Oily => "oily",
            SkinType::Dry => "dry",
            SkinType::Combination => "combination",
            SkinType::Sensitive => "sensitive",
            SkinType::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinGoal {
    Acne,
    Glow,
    Hydrate,
    Protect,
}

impl SkinGoal {
    pub const ALL: [SkinGoal; 4] = [
        SkinGoal::Acne,
        SkinGoal::Glow,
        SkinGoal::Hydrate,
        SkinGoal::Protect,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "acne" => Some(SkinGoal::Acne),
            "glow" => Some(SkinGoal::Glow),
            "hydrate" => Some(SkinGoal::Hydrate),
            "protect" => Some(SkinGoal::Protect),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkinGoal::Acne => "acne",
            SkinGoal::Glow => "glow",
            SkinGoal::Hydrate => "hydrate",
            SkinGoal::Protect => "protect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Great,
    Good,
    Caution,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Great, Verdict::Good, Verdict::Caution];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "great" => Some(Verdict::Great),
            "good" => Some(Verdict::Good),
            "caution" => Some(Verdict::Caution),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Great => "great",
            Verdict::Good => "good",
            Verdict::Caution => "caution",
        }
    }
}

/// Direction reported by the client for a tracked metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricTrend {
    Up,
    Down,
}

impl MetricTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricTrend::Up => "up",
            MetricTrend::Down => "down",
        }
    }
}

/// Direction of an analyzed metric. Neutral only appears in output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

impl Trend {
    pub const ALL: [Trend; 3] = [Trend::Up, Trend::Down, Trend::Neutral];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "up" => Some(Trend::Up),
            "down" => Some(Trend::Down),
            "neutral" => Some(Trend::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient_skin_type")]
    pub skin_type: Option<SkinType>,
    #[serde(default, deserialize_with = "lenient_goals")]
    pub goals: Vec<SkinGoal>,
}

impl EvaluationRequest {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            skin_type: None,
            goals: Vec::new(),
        }
    }

    pub fn with_skin_type(mut self, skin_type: SkinType) -> Self {
        self.skin_type = Some(skin_type);
        self
    }

    pub fn with_goals(mut self, goals: Vec<SkinGoal>) -> Self {
        self.goals = goals;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub fit_score: u8,
    pub verdict: Verdict,
    pub insights: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressMetric {
    pub label: String,
    pub value: f64,
    pub trend: MetricTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInsightRequest {
    #[serde(default)]
    pub metrics: Vec<ProgressMetric>,
    #[serde(default)]
    pub days_tracked: u32,
}

/// Which progress photo angles the user has on file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAvailability {
    #[serde(default)]
    pub front: bool,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
}

impl PhotoAvailability {
    pub fn available_angles(&self) -> Vec<&'static str> {
        [("front", self.front), ("left", self.left), ("right", self.right)]
            .into_iter()
            .filter(|(_, present)| *present)
            .map(|(angle, _)| angle)
            .collect()
    }

    pub fn any(&self) -> bool {
        self.front || self.left || self.right
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoAnalysisRequest {
    #[serde(default)]
    pub current: PhotoAvailability,
    #[serde(default)]
    pub previous: Option<PhotoAvailability>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedMetric {
    pub label: String,
    pub value: f64,
    pub trend: Trend,
    pub is_good: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAnalysis {
    pub metrics: Vec<AnalyzedMetric>,
    pub insight: String,
}

fn lenient_skin_type<'de, D>(deserializer: D) -> Result<Option<SkinType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(SkinType::parse))
}

// Unknown goals are dropped rather than rejected; order is kept.
fn lenient_goals<'de, D>(deserializer: D) -> Result<Vec<SkinGoal>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .filter_map(SkinGoal::parse)
        .collect())
}
