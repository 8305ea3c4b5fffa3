//! HTTP adapter for the quiz gateway: questions, answer checks, hints and stats.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{AnswerOption, GameRecord, Question, QuestionId};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{GatewayConfigError, ProviderError};
use crate::hints::{HINT_MODEL, HintRequest};
use crate::providers::{AnswerVerdict, Credential, HintProvider, QuestionProvider, StatsSink};

pub const GATEWAY_URL_VAR: &str = "QUIZ_GATEWAY_URL";
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    base_url: Url,
}

impl GatewayConfig {
    /// # Errors
    ///
    /// Returns `GatewayConfigError::InvalidUrl` unless `base_url` is an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, GatewayConfigError> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|err| GatewayConfigError::InvalidUrl(format!("{base_url}: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(GatewayConfigError::InvalidUrl(base_url.to_owned()));
        }
        Ok(Self { base_url: parsed })
    }

    /// Read `QUIZ_GATEWAY_URL`, falling back to the local gateway.
    ///
    /// # Errors
    ///
    /// Returns `GatewayConfigError::InvalidUrl` if the variable is set to something
    /// that is not an http(s) URL.
    pub fn from_env() -> Result<Self, GatewayConfigError> {
        let base_url = env::var(GATEWAY_URL_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.into());
        Self::new(&base_url)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::Unavailable(format!("bad gateway url {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Talks to the gateway over HTTP; implements every external collaborator.
#[derive(Clone, Debug)]
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    /// # Errors
    ///
    /// Returns `GatewayConfigError::Client` if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayConfigError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// # Errors
    ///
    /// See [`GatewayConfig::from_env`] and [`GatewayClient::new`].
    pub fn from_env() -> Result<Self, GatewayConfigError> {
        Self::new(GatewayConfig::from_env()?)
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[async_trait]
impl QuestionProvider for GatewayClient {
    async fn fetch_question(&self, category: Option<&str>) -> Result<Question, ProviderError> {
        let url = match category {
            Some(category) => self.config.endpoint(&["question", category])?,
            None => self.config.endpoint(&["question"])?,
        };
        debug!(%url, "fetching question");
        let response = check_status(self.client.get(url).send().await?)?;
        let body: QuestionResponse = response.json().await?;
        body.into_question()
    }

    async fn submit_answer(
        &self,
        question_id: &QuestionId,
        choice: &AnswerOption,
    ) -> Result<AnswerVerdict, ProviderError> {
        let url = self.config.endpoint(&["answer"])?;
        let payload = AnswerRequest {
            question_id: question_id.as_str(),
            answer: choice.as_str(),
        };
        let response = check_status(self.client.post(url).json(&payload).send().await?)?;
        let body: AnswerResponse = response.json().await?;
        Ok(AnswerVerdict {
            correct: body.correct,
        })
    }
}

#[async_trait]
impl HintProvider for GatewayClient {
    async fn request_hint(&self, request: &HintRequest) -> Result<String, ProviderError> {
        let url = self.config.endpoint(&["askllm"])?;
        let payload = AskRequest {
            question: request.prompt(),
            model: HINT_MODEL,
        };
        let response = check_status(self.client.post(url).json(&payload).send().await?)?;
        let body: AskResponse = response.json().await?;
        body.answer
            .map(|answer| answer.trim().to_owned())
            .filter(|answer| !answer.is_empty())
            .ok_or_else(|| ProviderError::Decode("empty hint".into()))
    }
}

#[async_trait]
impl StatsSink for GatewayClient {
    async fn record_game(
        &self,
        record: &GameRecord,
        credential: &Credential,
    ) -> Result<(), ProviderError> {
        let url = self.config.endpoint(&["statistics"])?;
        let response = self
            .client
            .post(url)
            .bearer_auth(credential.token())
            .json(record)
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }
}

fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ProviderError::Unauthorized);
    }
    if !status.is_success() {
        return Err(ProviderError::Status(status.as_u16()));
    }
    Ok(response)
}

#[derive(Debug, Deserialize)]
struct QuestionResponse {
    id: String,
    question: String,
    #[serde(default)]
    images: Vec<String>,
}

impl QuestionResponse {
    fn into_question(self) -> Result<Question, ProviderError> {
        let options = self.images.into_iter().map(AnswerOption::new).collect();
        Question::new(QuestionId::new(self.id), self.question, options)
            .map_err(|err| ProviderError::Decode(err.to_string()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRequest<'a> {
    question_id: &'a str,
    answer: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnswerResponse {
    correct: bool,
}

#[derive(Debug, Serialize)]
struct AskRequest {
    question: String,
    model: &'static str,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    answer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_non_http_urls() {
        assert!(GatewayConfig::new("http://localhost:8000").is_ok());
        assert!(GatewayConfig::new("https://quiz.example.com/api/").is_ok());
        assert!(matches!(
            GatewayConfig::new("localhost:8000"),
            Err(GatewayConfigError::InvalidUrl(_))
        ));
        assert!(matches!(
            GatewayConfig::new("ftp://quiz.example.com"),
            Err(GatewayConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn endpoints_append_to_base_path() {
        let config = GatewayConfig::new("https://quiz.example.com/api/").unwrap();
        assert_eq!(
            config.endpoint(&["question"]).unwrap().as_str(),
            "https://quiz.example.com/api/question"
        );

        let config = GatewayConfig::new("http://localhost:8000").unwrap();
        assert_eq!(
            config.endpoint(&["question", "flags and capitals"]).unwrap().as_str(),
            "http://localhost:8000/question/flags%20and%20capitals"
        );
    }

    #[test]
    fn answer_payload_uses_gateway_field_names() {
        let payload = AnswerRequest {
            question_id: "q-1",
            answer: "https://img/1.png",
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["questionId"], "q-1");
        assert_eq!(value["answer"], "https://img/1.png");
    }

    #[test]
    fn question_response_becomes_question() {
        let body: QuestionResponse = serde_json::from_str(
            r#"{"id":"abc","question":"Which flag belongs to Chile?","images":["a.png","b.png"]}"#,
        )
        .unwrap();
        let question = body.into_question().unwrap();
        assert_eq!(question.id().as_str(), "abc");
        assert_eq!(question.options().len(), 2);
        assert!(question.has_option(&AnswerOption::new("b.png")));
    }

    #[test]
    fn question_without_images_is_a_decode_error() {
        let body: QuestionResponse =
            serde_json::from_str(r#"{"id":"abc","question":"Which flag?"}"#).unwrap();
        assert!(matches!(body.into_question(), Err(ProviderError::Decode(_))));
    }
}
