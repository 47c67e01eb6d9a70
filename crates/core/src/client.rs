use crate::error::GENERIC_SERVICE_ERROR;
use crate::traits::RankingService;
use crate::{ErrorBody, MatchError, MatchRequest, MatchResponse, ServiceConfig};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

pub struct HttpRankingService {
    config: ServiceConfig,
    client: Client,
}

impl HttpRankingService {
    pub fn new(config: ServiceConfig) -> Result<Self, MatchError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Banner served at the service root.
    pub async fn health(&self) -> Result<String, MatchError> {
        let response = self.client.get(self.config.endpoint("")?).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(service_error(status, &body));
        }

        let parsed: Value = serde_json::from_slice(&body)?;
        Ok(parsed
            .pointer("/message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    /// Downloads the raw bytes of a matched resume.
    pub async fn fetch_resume(&self, file_name: &str) -> Result<Vec<u8>, MatchError> {
        let url = self.resume_url(file_name);
        debug!(url = %url, "fetching resume");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(service_error(status, &body));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl RankingService for HttpRankingService {
    async fn rank(&self, request: &MatchRequest) -> Result<MatchResponse, MatchError> {
        let response = self
            .client
            .post(self.config.endpoint("match")?)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        interpret_match_response(status, &body)
    }

    fn resume_url(&self, file_name: &str) -> Url {
        self.config.resume_url(file_name)
    }
}

pub fn interpret_match_response(
    status: StatusCode,
    body: &[u8],
) -> Result<MatchResponse, MatchError> {
    if !status.is_success() {
        return Err(service_error(status, body));
    }

    let parsed: MatchResponse = serde_json::from_slice(body)?;
    debug!(
        candidates = parsed.ranked_candidates.len(),
        has_analysis = parsed.analysis.is_some(),
        "ranking service answered"
    );
    Ok(parsed)
}

fn service_error(status: StatusCode, body: &[u8]) -> MatchError {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.detail)
        .filter(|detail| !detail.is_empty());

    if detail.is_none() {
        warn!(status = %status, "ranking service error without detail");
    }

    MatchError::Service {
        status: status.as_u16(),
        message: detail.unwrap_or_else(|| GENERIC_SERVICE_ERROR.to_string()),
    }
}
