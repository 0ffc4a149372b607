//! Workout extraction: prompt the text-generation service with the video's
//! title, description and comments, then validate and normalize its JSON.

use std::{sync::Arc, sync::LazyLock, time::Duration};

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::{
    completion::{CompletionBackend, CompletionRequest},
    error::{FitbriefError, Result},
    retry::{RetryError, retry},
    types::{Exercise, WorkoutAnalysis},
};

const DESCRIPTION_LIMIT: usize = 1500;
const COMMENTS_LIMIT: usize = 1000;
const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 1000;

const DEFAULT_EXERCISE_NAME: &str = "Unknown Exercise";
const DEFAULT_SETS: &str = "1";
const DEFAULT_REPS: &str = "Not specified";
const DEFAULT_INTENSITY: &str = "Medium";
const DEFAULT_REST_PERIOD: &str = "30-60 seconds";
const DEFAULT_CALORIES: &str = "150-300 calories";

static SYSTEM_PROMPT: &str = r#"You are a fitness expert that analyzes workout videos. Return ONLY a JSON object with this structure:
{
  "workoutType": string,
  "difficulty": string,
  "equipment": string[],
  "targetMuscles": string[],
  "estimatedCalories": string,
  "exercises": [{
    "name": string,
    "sets": string,
    "reps": string,
    "notes": string,
    "duration": string?,
    "rounds": string?,
    "targetMuscles": string[],
    "intensity": string,
    "restPeriod": string
  }]
}"#;

static RETRY_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"try again in (\d+\.?\d*)s").expect("retry-after pattern is valid")
});

/// How the analyzer backs off when the service reports rate limiting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait used when the error does not suggest one.
    pub default_wait: Duration,
    /// Added on top of the suggested wait.
    pub padding: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            default_wait: Duration::from_secs(5),
            padding: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, err: &FitbriefError) -> Duration {
        let suggested = match err {
            FitbriefError::RateLimited { message } => parse_retry_after(message),
            _ => None,
        };
        suggested.unwrap_or(self.default_wait) + self.padding
    }
}

/// Parse the wait suggested by messages like "Please try again in 2.5s."
pub fn parse_retry_after(message: &str) -> Option<Duration> {
    let captures = RETRY_AFTER.captures(message)?;
    let seconds: f64 = captures[1].parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

pub struct ContentAnalyzer {
    backend: Arc<dyn CompletionBackend>,
    policy: RetryPolicy,
}

impl ContentAnalyzer {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Derive a workout plan from the video's text. A missing API key is
    /// reported as such; every later failure is logged in detail and surfaced
    /// as [`FitbriefError::AnalysisFailed`] with the specific error as source.
    pub async fn analyze(
        &self,
        title: &str,
        description: &str,
        comments: &str,
    ) -> Result<WorkoutAnalysis> {
        self.backend.ensure_credentials()?;

        let request = build_request(title, description, comments);
        self.request_analysis(&request).await.map_err(|e| {
            error!(service = self.backend.service_name(), error = %e, "workout analysis failed");
            FitbriefError::AnalysisFailed {
                source: Box::new(e),
            }
        })
    }

    async fn request_analysis(&self, request: &CompletionRequest) -> Result<WorkoutAnalysis> {
        let policy = self.policy;
        let outcome = retry(
            policy.max_attempts,
            FitbriefError::is_rate_limited,
            |e| policy.delay_for(e),
            |attempt| {
                debug!(attempt, "requesting workout analysis");
                self.backend.complete(request)
            },
        )
        .await;

        let content = match outcome {
            Ok(content) => content,
            Err(RetryError::Fatal(e)) => return Err(e),
            Err(RetryError::Exhausted { attempts, last }) => {
                return Err(FitbriefError::RetriesExhausted {
                    attempts,
                    last: Box::new(last),
                });
            }
        };

        let content = content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| FitbriefError::EmptyCompletion {
                service: self.backend.service_name().to_string(),
            })?;

        parse_analysis(&content)
    }
}

/// First `limit` characters of `text`.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_request(title: &str, description: &str, comments: &str) -> CompletionRequest {
    let user = format!(
        "Title: {title}\n\
         Description: {description}\n\
         Top Comments: {comments}\n\
         \n\
         Analyze this fitness video content and provide a detailed workout breakdown in JSON format.\n\
         Focus on extracting:\n\
         1. Workout type\n\
         2. Difficulty level\n\
         3. Required equipment\n\
         4. Target muscle groups\n\
         5. Estimated calories\n\
         6. Exercise details (sets, reps, form notes)",
        description = truncate_chars(description, DESCRIPTION_LIMIT),
        comments = truncate_chars(comments, COMMENTS_LIMIT),
    );

    CompletionRequest {
        system: SYSTEM_PROMPT.to_string(),
        user,
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}

/// Models sometimes wrap JSON in a markdown code fence.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse the model output into a [`WorkoutAnalysis`]. `workoutType`,
/// `difficulty` and an `exercises` array are required; everything else is
/// defaulted.
pub fn parse_analysis(content: &str) -> Result<WorkoutAnalysis> {
    let value: Value = serde_json::from_str(strip_code_fence(content))?;
    let Value::Object(analysis) = value else {
        return Err(invalid("expected a JSON object"));
    };

    let workout_type =
        text(analysis.get("workoutType")).ok_or_else(|| invalid("missing workoutType"))?;
    let difficulty =
        text(analysis.get("difficulty")).ok_or_else(|| invalid("missing difficulty"))?;
    let Some(Value::Array(exercises)) = analysis.get("exercises") else {
        return Err(invalid("exercises is not a list"));
    };

    Ok(WorkoutAnalysis {
        workout_type,
        difficulty,
        equipment: string_list(analysis.get("equipment")),
        target_muscles: string_list(analysis.get("targetMuscles")),
        estimated_calories: text(analysis.get("estimatedCalories"))
            .unwrap_or_else(|| DEFAULT_CALORIES.to_string()),
        exercises: exercises.iter().map(normalize_exercise).collect(),
    })
}

/// Fill every missing exercise field with its default. Entries that are not
/// objects become an exercise made entirely of defaults.
pub fn normalize_exercise(value: &Value) -> Exercise {
    let empty = Map::new();
    let fields = value.as_object().unwrap_or(&empty);
    let text_or = |key: &str, default: &str| {
        text(fields.get(key)).unwrap_or_else(|| default.to_string())
    };

    Exercise {
        name: text_or("name", DEFAULT_EXERCISE_NAME),
        sets: text_or("sets", DEFAULT_SETS),
        reps: text_or("reps", DEFAULT_REPS),
        notes: text_or("notes", ""),
        duration: passthrough(fields.get("duration")),
        rounds: passthrough(fields.get("rounds")),
        target_muscles: string_list(fields.get("targetMuscles")),
        intensity: text_or("intensity", DEFAULT_INTENSITY),
        rest_period: text_or("restPeriod", DEFAULT_REST_PERIOD),
    }
}

fn invalid(reason: &str) -> FitbriefError {
    FitbriefError::InvalidAnalysis {
        reason: reason.to_string(),
    }
}

/// Scalar field rendered as text. Empty strings, zero, `false`, `null` and
/// non-scalar values count as absent.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Optional field kept as sent, only converted to text.
fn passthrough(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
