use serde::{Deserialize, Serialize};

/// Video fields as returned by the YouTube Data API, before display formatting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawVideoMetadata {
    pub title: String,
    pub description: String,
    pub channel_title: String,
    /// ISO-8601 duration, e.g. `PT12M30S`.
    pub duration: String,
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub thumbnails: Thumbnails,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Thumbnails {
    pub high: Option<String>,
    pub medium: Option<String>,
    pub default: Option<String>,
}

impl Thumbnails {
    /// Highest resolution available, empty when YouTube sent none.
    pub fn best(&self) -> String {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    pub sets: String,
    pub reps: String,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<String>,
    pub target_muscles: Vec<String>,
    pub intensity: String,
    pub rest_period: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutAnalysis {
    pub workout_type: String,
    pub difficulty: String,
    pub equipment: Vec<String>,
    pub target_muscles: Vec<String>,
    pub estimated_calories: String,
    pub exercises: Vec<Exercise>,
}

/// Final result of one pipeline run: display-ready video fields merged with
/// the workout analysis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub title: String,
    pub thumbnail: String,
    pub duration: String,
    pub views: String,
    pub likes: String,
    pub channel_name: String,
    pub workout_type: String,
    pub difficulty: String,
    pub equipment: Vec<String>,
    pub target_muscles: Vec<String>,
    pub estimated_calories: String,
    pub exercises: Vec<Exercise>,
}

/// Styling bucket for the free-form difficulty string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DifficultyTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyTier {
    pub fn classify(difficulty: &str) -> Self {
        match difficulty.to_lowercase().as_str() {
            "beginner" => DifficultyTier::Beginner,
            "intermediate" => DifficultyTier::Intermediate,
            _ => DifficultyTier::Advanced,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntensityTier {
    High,
    Medium,
    Low,
    Other,
}

impl IntensityTier {
    pub fn classify(intensity: &str) -> Self {
        match intensity.to_lowercase().as_str() {
            "high" => IntensityTier::High,
            "medium" => IntensityTier::Medium,
            "low" => IntensityTier::Low,
            _ => IntensityTier::Other,
        }
    }
}
