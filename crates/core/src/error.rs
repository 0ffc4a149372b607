use thiserror::Error;

pub const GENERIC_ANALYSIS_FAILURE: &str =
    "Failed to analyze workout content. Please try again later.";
pub const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again.";

#[derive(Error, Debug)]
pub enum FitbriefError {
    #[error("Invalid YouTube URL. Please check the URL and try again.")]
    InvalidUrl { url: String },

    #[error("{service} API key is missing: set the {env_var} environment variable")]
    MissingApiKey {
        service: &'static str,
        env_var: &'static str,
    },

    #[error("{message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Video not found or is not accessible")]
    VideoNotFound { video_id: String },

    #[error("Rate limit reached: {message}")]
    RateLimited { message: String },

    #[error("No analysis content received from {service}")]
    EmptyCompletion { service: String },

    #[error("Invalid analysis format received: {reason}")]
    InvalidAnalysis { reason: String },

    #[error("Failed to analyze workout after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<FitbriefError>,
    },

    #[error("Failed to analyze workout content. Please try again later.")]
    AnalysisFailed {
        #[source]
        source: Box<FitbriefError>,
    },

    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FitbriefError {
    /// Message suitable for an error banner. Upstream and domain messages are
    /// kept, transport and decoding details are replaced with a generic line.
    pub fn user_message(&self) -> String {
        match self {
            FitbriefError::Http(_) | FitbriefError::Json(_) => GENERIC_FAILURE.to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FitbriefError::RateLimited { .. })
    }
}

pub type Result<T> = std::result::Result<T, FitbriefError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn upstream_message_is_shown_verbatim() {
        let err = FitbriefError::Upstream {
            service: "YouTube",
            status: 403,
            message: "The request cannot be completed because you have exceeded your quota."
                .to_string(),
        };
        assert_eq!(
            err.user_message(),
            "The request cannot be completed because you have exceeded your quota."
        );
    }

    #[test]
    fn json_errors_fall_back_to_generic_message() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = FitbriefError::from(json_err);
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn analysis_failure_keeps_specific_source() {
        let err = FitbriefError::AnalysisFailed {
            source: Box::new(FitbriefError::InvalidAnalysis {
                reason: "missing workoutType".to_string(),
            }),
        };
        assert_eq!(err.user_message(), GENERIC_ANALYSIS_FAILURE);
        let source = err.source().map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("Invalid analysis format received: missing workoutType")
        );
    }
}
