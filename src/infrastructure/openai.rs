//! Chat-completions client used for every language task.

use crate::domain::ports::LanguageModel;
use crate::error::{BotError, Result};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Clone)]
pub struct OpenAiModel {
    /// Without a key every call fails, and callers fall back.
    api_key: Option<String>,
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiModel {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Points the client at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn complete(&self, system_prompt: &str, user_text: &str, max_tokens: u32) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| BotError::Model("OPENAI_API_KEY is not set".to_string()))?;

        let body = serde_json::json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_text}
            ],
            "max_tokens": max_tokens,
            "temperature": 0
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Model(format!("OpenAI API error {status}: {body}")));
        }

        let api_response: ApiResponse = response.json().await?;
        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| BotError::Model("OpenAI returned no choices".to_string()))?;
        tracing::debug!(chars = content.len(), "completion received");
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let model = OpenAiModel::new(None).with_base_url("http://127.0.0.1:9");
        let err = model.complete("system", "user", 10).await.unwrap_err();
        assert!(matches!(err, BotError::Model(_)));
    }

    #[tokio::test]
    async fn test_complete_sends_prompts_and_trims_answer() {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][0]["content"], "classify");
                assert_eq!(body["messages"][1]["content"], "oui");
                assert_eq!(body["max_tokens"], 10);
                Json(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": " yes \n"}}]
                }))
            }),
        );
        let base = serve(router).await;

        let model = OpenAiModel::new(Some("sk-test".to_string())).with_base_url(base);
        assert_eq!(model.complete("classify", "oui", 10).await.unwrap(), "yes");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { (axum::http::StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base = serve(router).await;

        let model = OpenAiModel::new(Some("sk-wrong".to_string())).with_base_url(base);
        let err = model.complete("s", "u", 5).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
