//! Fitbrief Core Library
//!
//! Turns a YouTube workout video into a structured workout plan: video details
//! and comments from the YouTube Data API, exercise extraction through a
//! chat-completion model.

pub mod analyzer;
pub mod completion;
pub mod config;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod provider;
pub mod retry;
pub mod source;
pub mod types;
pub mod youtube;

// Re-export commonly used items at crate root
pub use analyzer::{ContentAnalyzer, RetryPolicy};
pub use completion::{ChatCompletionsClient, CompletionBackend, CompletionRequest};
pub use config::Settings;
pub use error::{FitbriefError, Result};
pub use format::{format_count, format_duration, format_summary_readable};
pub use pipeline::{Pipeline, Stage};
pub use provider::{Provider, ProviderConfig};
pub use source::{VideoId, extract_video_id};
pub use types::{DifficultyTier, Exercise, IntensityTier, VideoSummary, WorkoutAnalysis};
pub use youtube::YoutubeClient;
