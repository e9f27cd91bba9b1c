//! HTTP client for the Routebook API.

use chrono::{DateTime, Utc};
use reqwest::{Response, StatusCode};
use routebook_core::{Issue, Route, RouteInput, RoutePage, ValidationError};
use serde::Deserialize;
use std::time::Duration;

use crate::error::ClientError;

/// Default bound on every request to the server.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for a Routebook server.
#[derive(Debug, Clone)]
pub struct RoutebookClient {
    base_url: String,
    client: reqwest::Client,
}

/// Result of saving a route.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(Route),
    /// The server already had a route with these labels.
    AlreadySaved,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    /// Seconds since the server started
    pub uptime: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    issues: Vec<Issue>,
}

impl RoutebookClient {
    /// Create a client with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Save a route; an existing label pair is reported, not treated as an error.
    pub async fn save_route(&self, input: &RouteInput) -> Result<SaveOutcome, ClientError> {
        let response = self
            .client
            .post(self.url("/routes"))
            .json(input)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => Ok(SaveOutcome::Saved(response.json().await?)),
            StatusCode::NO_CONTENT => Ok(SaveOutcome::AlreadySaved),
            StatusCode::BAD_REQUEST => Err(validation_error(response).await),
            _ => Err(unexpected(response).await),
        }
    }

    /// Fetch one page of saved routes, newest first.
    pub async fn list_routes(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<RoutePage, ClientError> {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset));
        }

        let response = self
            .client
            .get(self.url("/routes"))
            .query(&query)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(unexpected(response).await);
        }
        Ok(response.json().await?)
    }

    /// Fetch a route, `None` if the server does not know the id.
    pub async fn get_route(&self, id: i64) -> Result<Option<Route>, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/routes/{}", id)))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(unexpected(response).await),
        }
    }

    /// Overwrite a saved route.
    pub async fn replace_route(&self, id: i64, input: &RouteInput) -> Result<Route, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/routes/{}", id)))
            .json(input)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::BAD_REQUEST => Err(validation_error(response).await),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(id)),
            StatusCode::CONFLICT => Err(ClientError::Conflict),
            _ => Err(unexpected(response).await),
        }
    }

    /// Delete a route. Returns `false` if it did not exist.
    pub async fn delete_route(&self, id: i64) -> Result<bool, ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/routes/{}", id)))
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(unexpected(response).await),
        }
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        let response = self.client.get(self.url("/health")).send().await?;
        if response.status() != StatusCode::OK {
            return Err(unexpected(response).await);
        }
        Ok(response.json().await?)
    }
}

async fn validation_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return err.into(),
    };

    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) if !parsed.issues.is_empty() => ValidationError {
            issues: parsed.issues,
        }
        .into(),
        _ => ClientError::UnexpectedStatus { status, body },
    }
}

async fn unexpected(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ClientError::UnexpectedStatus { status, body }
}
