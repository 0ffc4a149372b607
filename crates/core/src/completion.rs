use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{FitbriefError, Result},
    provider::Provider,
};

/// One system + user exchange sent to a chat-completion service.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// A text-generation service. Implementations report rate limiting as
/// [`FitbriefError::RateLimited`] so callers can back off and retry.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn service_name(&self) -> &str;

    /// Fail fast when the service cannot be called at all.
    fn ensure_credentials(&self) -> Result<()>;

    /// Returns the content of the first choice, `None` when the service sent none.
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>>;
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct ChatCompletionsClient {
    http: Client,
    provider: Provider,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    /// OpenAI sends a string code, Google-style APIs a numeric one.
    code: Option<serde_json::Value>,
}

impl ChatCompletionsClient {
    pub fn new(
        http: Client,
        provider: Provider,
        api_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            provider,
            api_url: api_url.into(),
            model: model.into(),
            api_key,
        }
    }

    fn error_from_response(&self, status: StatusCode, body: &str) -> FitbriefError {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error);
        let code = parsed.as_ref().and_then(|e| e.code.clone());
        let message = parsed
            .and_then(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "{} request failed with status {}",
                    self.provider.name(),
                    status
                )
            });

        let rate_limited = match code {
            Some(serde_json::Value::String(code)) => code == "rate_limit_exceeded",
            // numeric codes only echo the HTTP status
            _ => status == StatusCode::TOO_MANY_REQUESTS,
        };

        if rate_limited {
            FitbriefError::RateLimited { message }
        } else {
            FitbriefError::Upstream {
                service: self.provider.name(),
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionsClient {
    fn service_name(&self) -> &str {
        self.provider.name()
    }

    fn ensure_credentials(&self) -> Result<()> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(FitbriefError::MissingApiKey {
                service: self.provider.name(),
                env_var: self.provider.config().env_var,
            }),
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>> {
        self.ensure_credentials()?;
        let api_key = self.api_key.as_deref().unwrap_or_default();
        debug!(provider = self.provider.name(), model = %self.model, "requesting completion");

        let response = self
            .http
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": request.system,
                    },
                    {
                        "role": "user",
                        "content": request.user,
                    },
                ],
                "temperature": request.temperature,
                "max_tokens": request.max_tokens,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.error_from_response(status, &body));
        }

        let response = response.json::<serde_json::Value>().await?;
        Ok(response["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string))
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "system prompt".into(),
            user: "user prompt".into(),
            temperature: 0.2,
            max_tokens: 1000,
        }
    }

    fn client(server: &MockServer, key: Option<&str>) -> ChatCompletionsClient {
        ChatCompletionsClient::new(
            Client::new(),
            Provider::Openai,
            format!("{}/v1/chat/completions", server.uri()),
            "gpt-4",
            key.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn sends_two_messages_and_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4",
                "temperature": 0.2,
                "max_tokens": 1000,
                "messages": [
                    {"role": "system", "content": "system prompt"},
                    {"role": "user", "content": "user prompt"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"ok\":true}"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let content = client(&server, Some("sk-test"))
            .complete(&request())
            .await
            .unwrap();
        assert_eq!(content.as_deref(), Some("{\"ok\":true}"));
    }

    #[tokio::test]
    async fn missing_content_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let content = client(&server, Some("sk")).complete(&request()).await.unwrap();
        assert_eq!(content, None);
    }

    #[tokio::test]
    async fn rate_limit_code_is_recognised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "message": "Rate limit reached for gpt-4. Please try again in 2.5s.",
                    "type": "requests",
                    "code": "rate_limit_exceeded"
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server, Some("sk")).complete(&request()).await.unwrap_err();
        match err {
            FitbriefError::RateLimited { message } => {
                assert!(message.contains("try again in 2.5s"))
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn exhausted_quota_is_not_a_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "You exceeded your current quota.", "code": "insufficient_quota"}
            })))
            .mount(&server)
            .await;

        let err = client(&server, Some("sk")).complete(&request()).await.unwrap_err();
        assert!(matches!(err, FitbriefError::Upstream { status: 429, .. }));
        assert_eq!(err.user_message(), "You exceeded your current quota.");
    }

    #[tokio::test]
    async fn bare_429_counts_as_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client(&server, Some("sk")).complete(&request()).await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn numeric_error_code_keeps_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid. Please pass a valid API key."}
            })))
            .mount(&server)
            .await;

        let err = client(&server, Some("sk")).complete(&request()).await.unwrap_err();
        assert!(matches!(err, FitbriefError::Upstream { status: 400, .. }));
        assert_eq!(
            err.user_message(),
            "API key not valid. Please pass a valid API key."
        );
    }

    #[tokio::test]
    async fn numeric_code_on_429_counts_as_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": 429, "message": "Resource has been exhausted (e.g. check quota)."}
            })))
            .mount(&server)
            .await;

        let err = client(&server, Some("sk")).complete(&request()).await.unwrap_err();
        match err {
            FitbriefError::RateLimited { message } => {
                assert_eq!(message, "Resource has been exhausted (e.g. check quota).")
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_key_never_calls_the_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server, None).complete(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            FitbriefError::MissingApiKey { env_var: "OPENAI_API_KEY", .. }
        ));
    }
}
