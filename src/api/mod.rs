//! Backend collaborators for the focus timer.
//!
//! The controller only talks to the backend through the [`SessionService`] and
//! [`UserProfile`] traits; [`HttpClient`] implements both over the REST API.

pub mod client;
pub mod service;
pub mod types;

pub use client::HttpClient;
pub use service::{SessionService, UserProfile};
#[cfg(test)]
pub use service::{MockSessionService, MockUserProfile};
pub use types::{
    ApiError, FocusHistoryEntry, LeaderboardEntry, SessionId, SettlementRequest, SettlementResult,
    StartSessionRequest, StartSessionResponse, UserState,
};
