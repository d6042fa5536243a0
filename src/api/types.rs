//! Request and response types exchanged with the backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque session identifier issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /focus/start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub duration_minutes: u32,
}

/// Response of `POST /focus/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: SessionId,
    #[serde(default)]
    pub started_at: Option<String>,
}

/// Body of `POST /focus/end/{session_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRequest {
    /// Whole minutes worked, never below one.
    #[serde(rename = "actual_minutes")]
    pub elapsed_minutes: u32,
    /// Whether the bonus offer was accepted.
    pub double_credits: bool,
}

/// Reward computed by the backend for a settled session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub credits_earned: i64,
    pub xp_earned: i64,
    pub new_level: u32,
    #[serde(default)]
    pub streak_days: Option<u32>,
}

/// The signed-in user as reported by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub credits: i64,
    #[serde(default)]
    pub xp: i64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(default)]
    pub total_focus_minutes: i64,
}

const fn default_level() -> u32 {
    1
}

impl UserState {
    /// Fold a settlement into the cached state until the next refresh.
    pub fn apply_settlement(&mut self, request: SettlementRequest, result: &SettlementResult) {
        self.credits += result.credits_earned;
        self.xp += result.xp_earned;
        self.level = result.new_level;
        self.total_focus_minutes += i64::from(request.elapsed_minutes);
        if let Some(streak) = result.streak_days {
            self.streak_days = streak;
        }
    }
}

/// A completed session as listed by `GET /focus/history`, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusHistoryEntry {
    pub session_id: SessionId,
    pub duration_minutes: u32,
    #[serde(default)]
    pub actual_minutes: Option<u32>,
    #[serde(default)]
    pub credits_earned: i64,
    #[serde(default)]
    pub double_credits: bool,
    pub started_at: String,
    #[serde(default)]
    pub ended_at: Option<String>,
}

impl FocusHistoryEntry {
    /// Minutes actually worked, or the planned length if the backend has none.
    #[must_use]
    pub fn minutes(&self) -> u32 {
        self.actual_minutes.unwrap_or(self.duration_minutes)
    }
}

/// One row of `GET /community/leaderboard`, ordered by focus time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub total_focus_minutes: i64,
    #[serde(default)]
    pub streak_days: u32,
}

/// Failure talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Missing or rejected bearer token.
    #[error("Not authenticated: set api.token in config.yaml or PONCIK_TOKEN")]
    Unauthorized,

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never reached the server.
    #[error("Connection failed: {message}")]
    Transport { message: String },

    /// The response body could not be decoded.
    #[error("Unexpected response: {message}")]
    Decode { message: String },
}

impl ApiError {
    /// Map a reqwest failure onto the taxonomy above.
    #[must_use]
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode {
                message: e.to_string(),
            }
        } else {
            Self::Transport {
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_request_wire_names() {
        let request = SettlementRequest {
            elapsed_minutes: 3,
            double_credits: true,
        };
        let value = serde_json::to_value(request).unwrap();
        assert_eq!(value["actual_minutes"], 3);
        assert_eq!(value["double_credits"], true);
    }

    #[test]
    fn test_settlement_result_without_streak() {
        let result: SettlementResult =
            serde_json::from_str(r#"{"credits_earned":25,"xp_earned":250,"new_level":2}"#)
                .unwrap();
        assert_eq!(result.credits_earned, 25);
        assert_eq!(result.new_level, 2);
        assert!(result.streak_days.is_none());
    }

    #[test]
    fn test_user_state_ignores_unknown_fields() {
        let user: UserState = serde_json::from_str(
            r#"{"user_id":"user_1","email":"a@b.c","name":"Ada","credits":50,"owned_items":[]}"#,
        )
        .unwrap();
        assert_eq!(user.user_id, "user_1");
        assert_eq!(user.credits, 50);
        assert_eq!(user.level, 1);
    }

    #[test]
    fn test_apply_settlement() {
        let mut user = UserState {
            user_id: "u".to_string(),
            name: String::new(),
            credits: 10,
            xp: 900,
            level: 1,
            streak_days: 2,
            total_focus_minutes: 40,
        };
        let request = SettlementRequest {
            elapsed_minutes: 25,
            double_credits: true,
        };
        let result = SettlementResult {
            credits_earned: 50,
            xp_earned: 250,
            new_level: 2,
            streak_days: Some(3),
        };

        user.apply_settlement(request, &result);

        assert_eq!(user.credits, 60);
        assert_eq!(user.xp, 1150);
        assert_eq!(user.level, 2);
        assert_eq!(user.streak_days, 3);
        assert_eq!(user.total_focus_minutes, 65);
    }

    #[test]
    fn test_api_error_serializes_with_kind() {
        let value = serde_json::to_value(ApiError::Status {
            status: 404,
            message: "Session not found".to_string(),
        })
        .unwrap();
        assert_eq!(value["kind"], "status");
        assert_eq!(value["status"], 404);

        let value = serde_json::to_value(ApiError::Timeout).unwrap();
        assert_eq!(value["kind"], "timeout");
    }

    #[test]
    fn test_session_id_is_transparent() {
        let id: SessionId = serde_json::from_str(r#""focus_abc123""#).unwrap();
        assert_eq!(id.as_str(), "focus_abc123");
        assert_eq!(id.to_string(), "focus_abc123");
    }
}
