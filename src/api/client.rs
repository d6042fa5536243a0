//! HTTP implementation of the backend collaborators.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::service::{SessionService, UserProfile};
use super::types::{
    ApiError, FocusHistoryEntry, LeaderboardEntry, SessionId, SettlementRequest,
    SettlementResult, StartSessionRequest, StartSessionResponse, UserState,
};
use crate::config::ApiConfig;

/// REST client for the PoncikFocus backend.
#[derive(Clone)]
pub struct HttpClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Build a client from the `api` config section.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::from_parts(&config.base_url, config.token.clone(), config.timeout())
    }

    /// Build a client from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn from_parts(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Base URL with the trailing slash removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Completed sessions of the signed-in user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    pub async fn focus_history(&self) -> Result<Vec<FocusHistoryEntry>, ApiError> {
        debug!("api: fetching focus history");
        self.send_json(self.http.get(self.url("focus/history")))
            .await
            .inspect_err(|e| warn!(error = %e, "api: focus/history failed"))
    }

    /// Users with the most focus time.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        debug!("api: fetching leaderboard");
        self.send_json(self.http.get(self.url("community/leaderboard")))
            .await
            .inspect_err(|e| warn!(error = %e, "api: community/leaderboard failed"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_detail(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode {
                message: e.to_string(),
            })
    }
}

/// Pull `detail` out of a JSON error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl SessionService for HttpClient {
    async fn start(&self, duration_minutes: u32) -> Result<SessionId, ApiError> {
        debug!(duration_minutes, "api: starting focus session");
        let request = self
            .http
            .post(self.url("focus/start"))
            .json(&StartSessionRequest { duration_minutes });

        let response: StartSessionResponse = self.send_json(request).await.inspect_err(|e| {
            warn!(error = %e, "api: focus/start failed");
        })?;
        Ok(response.session_id)
    }

    async fn end(
        &self,
        session_id: &SessionId,
        request: SettlementRequest,
    ) -> Result<SettlementResult, ApiError> {
        debug!(
            %session_id,
            elapsed_minutes = request.elapsed_minutes,
            double_credits = request.double_credits,
            "api: ending focus session"
        );
        let builder = self
            .http
            .post(self.url(&format!("focus/end/{session_id}")))
            .json(&request);

        self.send_json(builder).await.inspect_err(|e| {
            warn!(%session_id, error = %e, "api: focus/end failed");
        })
    }
}

#[async_trait]
impl UserProfile for HttpClient {
    async fn refresh(&self) -> Result<UserState, ApiError> {
        self.send_json(self.http.get(self.url("auth/me"))).await
    }
}
