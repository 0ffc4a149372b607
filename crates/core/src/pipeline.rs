use std::sync::Arc;

use reqwest::Client;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::{
    analyzer::ContentAnalyzer,
    completion::{ChatCompletionsClient, CompletionBackend},
    config::Settings,
    error::{FitbriefError, Result},
    format::{format_count, format_duration},
    source::extract_video_id,
    types::{RawVideoMetadata, VideoSummary, WorkoutAnalysis},
    youtube::YoutubeClient,
};

/// Step the pipeline is about to start, reported to progress observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    FetchingMetadata,
    FetchingComments,
    Analyzing,
}

impl Stage {
    pub fn describe(&self) -> &'static str {
        match self {
            Stage::FetchingMetadata => "Fetching video details...",
            Stage::FetchingComments => "Reading top comments...",
            Stage::Analyzing => "Analyzing workout content...",
        }
    }
}

/// URL in, [`VideoSummary`] out. Holds only immutable clients, so one
/// instance can serve any number of independent requests.
pub struct Pipeline {
    youtube: YoutubeClient,
    analyzer: ContentAnalyzer,
}

impl Pipeline {
    pub fn new(youtube: YoutubeClient, analyzer: ContentAnalyzer) -> Self {
        Self { youtube, analyzer }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let http = Client::new();
        let backend: Arc<dyn CompletionBackend> = Arc::new(ChatCompletionsClient::new(
            http.clone(),
            settings.provider,
            settings.llm_api_url.clone(),
            settings.model.clone(),
            settings.llm_api_key.clone(),
        ));
        let youtube = YoutubeClient::new(
            http,
            settings.youtube_base_url.clone(),
            settings.youtube_api_key.clone(),
        );
        Self::new(youtube, ContentAnalyzer::new(backend))
    }

    pub async fn summarize(&self, url: &str) -> Result<VideoSummary> {
        self.summarize_with(url, |_| {}).await
    }

    /// Run the full chain for one URL, calling `on_stage` before each network step.
    pub async fn summarize_with(
        &self,
        url: &str,
        on_stage: impl FnMut(Stage) + Send,
    ) -> Result<VideoSummary> {
        let span = info_span!("summarize", request_id = %Uuid::new_v4());
        async {
            let result = self.run(url, on_stage).await;
            if let Err(e) = &result {
                error!(error = %e, "summary failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, url: &str, mut on_stage: impl FnMut(Stage) + Send) -> Result<VideoSummary> {
        let video_id = extract_video_id(url).ok_or_else(|| FitbriefError::InvalidUrl {
            url: url.to_string(),
        })?;
        info!(%video_id, "summarizing video");

        on_stage(Stage::FetchingMetadata);
        let metadata = self.youtube.fetch_metadata(&video_id).await?;

        on_stage(Stage::FetchingComments);
        let comments = self.youtube.fetch_comments(&video_id).await?;

        on_stage(Stage::Analyzing);
        let analysis = self
            .analyzer
            .analyze(&metadata.title, &metadata.description, &comments)
            .await?;

        info!(%video_id, exercises = analysis.exercises.len(), "video summarized");
        Ok(merge(metadata, analysis))
    }
}

fn merge(metadata: RawVideoMetadata, analysis: WorkoutAnalysis) -> VideoSummary {
    VideoSummary {
        thumbnail: metadata.thumbnails.best(),
        duration: format_duration(&metadata.duration),
        views: format_count(metadata.view_count.as_deref()),
        likes: format_count(metadata.like_count.as_deref()),
        title: metadata.title,
        channel_name: metadata.channel_title,
        workout_type: analysis.workout_type,
        difficulty: analysis.difficulty,
        equipment: analysis.equipment,
        target_muscles: analysis.target_muscles,
        estimated_calories: analysis.estimated_calories,
        exercises: analysis.exercises,
    }
}
