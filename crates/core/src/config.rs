use crate::provider::Provider;

pub const YOUTUBE_API_KEY_VAR: &str = "YOUTUBE_API_KEY";
pub const YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Everything the pipeline needs from the outside world, resolved once at
/// start-up and handed to the clients explicitly.
#[derive(Clone, Debug)]
pub struct Settings {
    pub provider: Provider,
    pub model: String,
    pub llm_api_url: String,
    pub llm_api_key: Option<String>,
    pub youtube_base_url: String,
    pub youtube_api_key: Option<String>,
}

impl Settings {
    pub fn from_env(provider: Provider) -> Self {
        Self::from_lookup(provider, |name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(provider: Provider, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config = provider.config();
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            provider,
            model: config.model.to_string(),
            llm_api_url: config.api_url.to_string(),
            llm_api_key: non_empty(config.env_var),
            youtube_base_url: YOUTUBE_BASE_URL.to_string(),
            youtube_api_key: non_empty(YOUTUBE_API_KEY_VAR),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Names of required variables that are not set, for early start-up warnings.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.youtube_api_key.is_none() {
            missing.push(YOUTUBE_API_KEY_VAR);
        }
        if self.llm_api_key.is_none() {
            missing.push(self.provider.config().env_var);
        }
        missing
    }
}
