use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{BehaviorRecord, PersonaId, Product},
    error::ApiError,
    protocol::{behavior_path, recommendations_path, RecommendationsQuery, PRODUCTS_PATH},
};
use tracing::debug;
use url::Url;

use crate::{config::DashboardSettings, error::FetchError};

/// The three read-only operations of the recommendation backend.
#[async_trait]
pub trait RecommenderService: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, FetchError>;
    async fn user_behavior(&self, persona: PersonaId) -> Result<BehaviorRecord, FetchError>;
    async fn recommendations(&self, persona: PersonaId) -> Result<Vec<Product>, FetchError>;

    /// Where the service lives, for remediation hints.
    fn origin(&self) -> String {
        "the configured service".to_string()
    }
}

pub struct HttpRecommenderService {
    http: Client,
    base_url: String,
    recommendation_limit: Option<u32>,
}

impl HttpRecommenderService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).map_err(|source| FetchError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Transport {
                path: trimmed.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: trimmed.to_string(),
            recommendation_limit: None,
        })
    }

    pub fn from_settings(settings: &DashboardSettings) -> Result<Self, FetchError> {
        Ok(Self::new(&settings.api_base_url, settings.request_timeout())?
            .with_recommendation_limit(settings.recommendation_limit))
    }

    pub fn with_recommendation_limit(mut self, limit: Option<u32>) -> Self {
        self.recommendation_limit = limit;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|source| FetchError::InvalidUrl { url: raw, source })
    }

    async fn get_json<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let mut request = self.http.get(url);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|source| transport_error(path, source))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| transport_error(path, source))?;
        debug!(path, status = status.as_u16(), bytes = body.len(), "service response");

        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

fn transport_error(path: &str, source: reqwest::Error) -> FetchError {
    FetchError::Transport {
        path: path.to_string(),
        source,
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => api_error.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
    }
}

#[async_trait]
impl RecommenderService for HttpRecommenderService {
    async fn list_products(&self) -> Result<Vec<Product>, FetchError> {
        self.get_json::<_, ()>(PRODUCTS_PATH, None).await
    }

    async fn user_behavior(&self, persona: PersonaId) -> Result<BehaviorRecord, FetchError> {
        self.get_json::<_, ()>(&behavior_path(persona), None).await
    }

    async fn recommendations(&self, persona: PersonaId) -> Result<Vec<Product>, FetchError> {
        let query = RecommendationsQuery {
            limit: self.recommendation_limit,
        };
        let query = query.limit.is_some().then_some(&query);
        self.get_json(&recommendations_path(persona), query).await
    }

    fn origin(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
