//! YouTube Data API v3 client: video metadata and top comments.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::YOUTUBE_API_KEY_VAR,
    error::{FitbriefError, Result},
    source::VideoId,
    types::{RawVideoMetadata, Thumbnails},
};

const SERVICE: &str = "YouTube";
const MAX_COMMENTS: u32 = 100;

#[derive(Clone)]
pub struct YoutubeClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    snippet: Snippet,
    #[serde(default)]
    statistics: Option<Statistics>,
    #[serde(default)]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: ThumbnailSet,
}

#[derive(Debug, Default, Deserialize)]
struct ThumbnailSet {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

#[derive(Debug, Deserialize)]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    text_display: String,
}

/// Google APIs wrap failures as `{"error": {"code": 403, "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: Option<String>,
}

impl YoutubeClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or(FitbriefError::MissingApiKey {
                service: SERVICE,
                env_var: YOUTUBE_API_KEY_VAR,
            })
    }

    /// Fetch snippet, statistics and content details for one video.
    pub async fn fetch_metadata(&self, video_id: &VideoId) -> Result<RawVideoMetadata> {
        let api_key = self.api_key()?;
        let url = format!("{}/videos", self.base_url);
        debug!(%video_id, "fetching video metadata");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("part", "snippet,statistics,contentDetails"),
                ("id", video_id.as_str()),
                ("key", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<GoogleErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Failed to fetch video details".to_string());
            return Err(FitbriefError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        let body: VideoListResponse = response.json().await?;
        let video = body
            .items
            .into_iter()
            .next()
            .ok_or_else(|| FitbriefError::VideoNotFound {
                video_id: video_id.to_string(),
            })?;

        let statistics = video.statistics;
        let thumbnails = video.snippet.thumbnails;

        Ok(RawVideoMetadata {
            title: video.snippet.title,
            description: video.snippet.description,
            channel_title: video.snippet.channel_title,
            duration: video
                .content_details
                .map(|details| details.duration)
                .unwrap_or_default(),
            view_count: statistics.as_ref().and_then(|s| s.view_count.clone()),
            like_count: statistics.as_ref().and_then(|s| s.like_count.clone()),
            thumbnails: Thumbnails {
                high: thumbnails.high.map(|t| t.url),
                medium: thumbnails.medium.map(|t| t.url),
                default: thumbnails.default.map(|t| t.url),
            },
        })
    }

    /// Fetch up to 100 top-level comments ordered by relevance, joined by
    /// newlines. Only a missing API key is an error; any failure of the request
    /// itself is logged and yields an empty string.
    pub async fn fetch_comments(&self, video_id: &VideoId) -> Result<String> {
        let api_key = self.api_key()?;

        match self.request_comments(video_id, api_key).await {
            Ok(comments) => Ok(comments),
            Err(e) => {
                warn!(%video_id, error = %e, "comments unavailable, continuing without them");
                Ok(String::new())
            }
        }
    }

    async fn request_comments(&self, video_id: &VideoId, api_key: &str) -> Result<String> {
        let url = format!("{}/commentThreads", self.base_url);
        let max_results = MAX_COMMENTS.to_string();
        debug!(%video_id, "fetching comments");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("videoId", video_id.as_str()),
                ("maxResults", max_results.as_str()),
                ("order", "relevance"),
                ("key", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FitbriefError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        let body: CommentThreadListResponse = response.json().await?;
        Ok(body
            .items
            .into_iter()
            .map(|thread| thread.snippet.top_level_comment.snippet.text_display)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::*;
    use crate::source::extract_video_id;

    fn client(server: &MockServer, key: Option<&str>) -> YoutubeClient {
        YoutubeClient::new(Client::new(), server.uri(), key.map(str::to_string))
    }

    fn video_id() -> VideoId {
        extract_video_id("https://youtu.be/abc123").unwrap()
    }

    #[tokio::test]
    async fn metadata_is_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("part", "snippet,statistics,contentDetails"))
            .and(query_param("id", "abc123"))
            .and(query_param("key", "yt-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "snippet": {
                        "title": "Full Body HIIT",
                        "description": "No equipment needed",
                        "channelTitle": "Coach",
                        "thumbnails": {
                            "default": {"url": "https://i.ytimg.com/d.jpg"},
                            "medium": {"url": "https://i.ytimg.com/m.jpg"}
                        }
                    },
                    "statistics": {"viewCount": "1500", "likeCount": "42"},
                    "contentDetails": {"duration": "PT20M5S"}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let meta = client(&server, Some("yt-key"))
            .fetch_metadata(&video_id())
            .await
            .unwrap();

        assert_eq!(meta.title, "Full Body HIIT");
        assert_eq!(meta.channel_title, "Coach");
        assert_eq!(meta.duration, "PT20M5S");
        assert_eq!(meta.view_count.as_deref(), Some("1500"));
        assert_eq!(meta.thumbnails.best(), "https://i.ytimg.com/m.jpg");
    }

    #[tokio::test]
    async fn statistics_may_be_hidden() {
        let server = MockServer::start().await;
        Mock::given(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "snippet": {"title": "t", "description": "", "channelTitle": "c", "thumbnails": {}},
                    "contentDetails": {"duration": "PT45S"}
                }]
            })))
            .mount(&server)
            .await;

        let meta = client(&server, Some("k"))
            .fetch_metadata(&video_id())
            .await
            .unwrap();
        assert_eq!(meta.view_count, None);
        assert_eq!(meta.like_count, None);
        assert_eq!(meta.thumbnails.best(), "");
    }

    #[tokio::test]
    async fn empty_result_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let err = client(&server, Some("k"))
            .fetch_metadata(&video_id())
            .await
            .unwrap_err();
        assert!(matches!(err, FitbriefError::VideoNotFound { .. }));
        assert_eq!(err.user_message(), "Video not found or is not accessible");
    }

    #[tokio::test]
    async fn upstream_error_message_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(path("/videos"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid. Please pass a valid API key."}
            })))
            .mount(&server)
            .await;

        let err = client(&server, Some("bad"))
            .fetch_metadata(&video_id())
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "API key not valid. Please pass a valid API key."
        );
    }

    #[tokio::test]
    async fn upstream_error_without_body_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(path("/videos"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = client(&server, Some("k"))
            .fetch_metadata(&video_id())
            .await
            .unwrap_err();
        assert!(matches!(err, FitbriefError::Upstream { status: 503, .. }));
        assert_eq!(err.to_string(), "Failed to fetch video details");
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let yt = client(&server, None);
        assert!(matches!(
            yt.fetch_metadata(&video_id()).await,
            Err(FitbriefError::MissingApiKey { .. })
        ));
        assert!(matches!(
            yt.fetch_comments(&video_id()).await,
            Err(FitbriefError::MissingApiKey { .. })
        ));
    }

    #[tokio::test]
    async fn comments_are_joined_with_newlines() {
        let server = MockServer::start().await;
        Mock::given(path("/commentThreads"))
            .and(query_param("videoId", "abc123"))
            .and(query_param("maxResults", "100"))
            .and(query_param("order", "relevance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"snippet": {"topLevelComment": {"snippet": {"textDisplay": "Great burn!"}}}},
                    {"snippet": {"topLevelComment": {"snippet": {"textDisplay": "3 rounds killed me"}}}}
                ]
            })))
            .mount(&server)
            .await;

        let comments = client(&server, Some("k"))
            .fetch_comments(&video_id())
            .await
            .unwrap();
        assert_eq!(comments, "Great burn!\n3 rounds killed me");
    }

    #[tokio::test]
    async fn disabled_comments_yield_empty_blob() {
        let server = MockServer::start().await;
        Mock::given(path("/commentThreads"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "The video has disabled comments."}
            })))
            .mount(&server)
            .await;

        let comments = client(&server, Some("k"))
            .fetch_comments(&video_id())
            .await
            .unwrap();
        assert_eq!(comments, "");
    }

    #[tokio::test]
    async fn undecodable_comments_yield_empty_blob() {
        let server = MockServer::start().await;
        Mock::given(path("/commentThreads"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let comments = client(&server, Some("k"))
            .fetch_comments(&video_id())
            .await
            .unwrap();
        assert_eq!(comments, "");
    }

    #[tokio::test]
    async fn unreachable_comments_endpoint_yields_empty_blob() {
        // nothing listens on port 9 locally
        let yt = YoutubeClient::new(Client::new(), "http://127.0.0.1:9", Some("k".into()));
        let comments = yt.fetch_comments(&video_id()).await.unwrap();
        assert_eq!(comments, "");
    }
}
