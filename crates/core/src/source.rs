use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Identifier of a single YouTube video, as found in a watch or share link.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the video identifier from a `youtube.com` watch URL (`v` query
/// parameter) or a `youtu.be` share URL (first path segment). Anything else,
/// including strings that do not parse as URLs, yields `None`.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let url = Url::parse(input).ok()?;
    let host = url.host_str()?;

    let id = if host.contains("youtube.com") {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())?
    } else if host == "youtu.be" {
        url.path().strip_prefix('/').unwrap_or(url.path()).to_string()
    } else {
        return None;
    };

    if id.is_empty() {
        return None;
    }
    Some(VideoId(id))
}
