//! Settlements that failed to reach the backend and were kept for later.

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use serde::Serialize;
use tracing::{debug, warn};

use super::mode::TimerMode;
use super::settlement::PendingSettlement;
use crate::api::{SessionId, SessionService, SettlementRequest, SettlementResult};
use crate::error::PoncikError;
use crate::storage::Database;

/// A queued settlement row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingRecord {
    pub id: i64,
    #[serde(flatten)]
    pub settlement: PendingSettlement,
    pub created_at: DateTime<Utc>,
    pub attempts: u32,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Result of re-sending queued settlements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    /// Settlements the backend accepted, with their rewards
    pub settled: Vec<(SessionId, SettlementResult)>,
    /// Settlements that failed again and stay queued
    pub failed: Vec<(SessionId, String)>,
}

/// Queue of settlements awaiting re-delivery.
pub struct PendingStore {
    db: Database,
}

impl PendingStore {
    /// Open the queue in the default database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn new() -> Result<Self, PoncikError> {
        let db = Database::open()?;
        Ok(Self { db })
    }

    /// Create a queue with an existing database connection.
    #[must_use]
    pub const fn with_database(db: Database) -> Self {
        Self { db }
    }

    /// Add a settlement to the queue and return its row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the settlement cannot be saved.
    pub fn enqueue(
        &self,
        pending: &PendingSettlement,
        error: Option<&str>,
    ) -> Result<i64, PoncikError> {
        let conn = self.db.connection();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r"INSERT INTO pending_settlements
              (session_id, mode, elapsed_minutes, double_credits, created_at,
               attempts, last_attempt, last_error)
              VALUES (?1, ?2, ?3, ?4, ?5, 1, ?5, ?6)",
            params![
                pending.session_id.as_str(),
                pending.mode.as_str(),
                pending.request.elapsed_minutes,
                pending.request.double_credits,
                now,
                error,
            ],
        )
        .map_err(|e| PoncikError::Database(format!("Failed to enqueue settlement: {e}")))?;

        Ok(conn.last_insert_rowid())
    }

    /// All queued settlements, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list(&self) -> Result<Vec<PendingRecord>, PoncikError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare(
                r"SELECT id, session_id, mode, elapsed_minutes, double_credits,
                         created_at, attempts, last_attempt, last_error
                  FROM pending_settlements
                  ORDER BY created_at ASC, id ASC",
            )
            .map_err(|e| PoncikError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([], row_to_record)
            .map_err(|e| PoncikError::Database(format!("Failed to query settlements: {e}")))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| PoncikError::Database(e.to_string()))?);
        }

        Ok(records)
    }

    /// Number of queued settlements.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<usize, PoncikError> {
        let count: i64 = self
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM pending_settlements", [], |row| {
                row.get(0)
            })
            .map_err(|e| PoncikError::Database(format!("Failed to count settlements: {e}")))?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Increment attempt count and record the latest error.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn record_attempt(&self, id: i64, error: &str) -> Result<(), PoncikError> {
        self.db
            .connection()
            .execute(
                r"UPDATE pending_settlements SET
                  last_attempt = ?1,
                  last_error = ?2,
                  attempts = attempts + 1
                  WHERE id = ?3",
                params![Utc::now().to_rfc3339(), error, id],
            )
            .map_err(|e| PoncikError::Database(format!("Failed to record attempt: {e}")))?;

        Ok(())
    }

    /// Delete a queued settlement.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete(&self, id: i64) -> Result<bool, PoncikError> {
        let rows = self
            .db
            .connection()
            .execute("DELETE FROM pending_settlements WHERE id = ?1", [id])
            .map_err(|e| PoncikError::Database(format!("Failed to delete settlement: {e}")))?;

        Ok(rows > 0)
    }

    /// Delete every queued settlement. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear(&self) -> Result<usize, PoncikError> {
        self.db
            .connection()
            .execute("DELETE FROM pending_settlements", [])
            .map_err(|e| PoncikError::Database(format!("Failed to clear settlements: {e}")))
    }

    /// Re-send every queued settlement once.
    ///
    /// Accepted settlements are removed; failures stay queued with the attempt recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the local database fails. Backend failures are reported
    /// in the [`FlushReport`] instead.
    pub async fn flush(&self, service: &dyn SessionService) -> Result<FlushReport, PoncikError> {
        let mut report = FlushReport::default();

        for record in self.list()? {
            let PendingSettlement {
                session_id,
                request,
                ..
            } = record.settlement;

            match service.end(&session_id, request).await {
                Ok(result) => {
                    debug!(%session_id, id = record.id, "queued settlement delivered");
                    self.delete(record.id)?;
                    report.settled.push((session_id, result));
                }
                Err(e) => {
                    warn!(%session_id, id = record.id, error = %e, "queued settlement failed again");
                    let message = e.to_string();
                    self.record_attempt(record.id, &message)?;
                    report.failed.push((session_id, message));
                }
            }
        }

        Ok(report)
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn row_to_record(row: &Row<'_>) -> Result<PendingRecord, rusqlite::Error> {
    let id: i64 = row.get(0)?;
    let session_id: String = row.get(1)?;
    let mode_str: String = row.get(2)?;
    let elapsed_minutes: u32 = row.get(3)?;
    let double_credits: bool = row.get(4)?;
    let created_at_str: String = row.get(5)?;
    let attempts: u32 = row.get(6)?;
    let last_attempt_str: Option<String> = row.get(7)?;
    let last_error: Option<String> = row.get(8)?;

    Ok(PendingRecord {
        id,
        settlement: PendingSettlement {
            session_id: SessionId::new(session_id),
            mode: TimerMode::parse(&mode_str).unwrap_or_default(),
            request: SettlementRequest {
                elapsed_minutes,
                double_credits,
            },
        },
        created_at: parse_timestamp(&created_at_str).unwrap_or_else(Utc::now),
        attempts,
        last_attempt: last_attempt_str.as_deref().and_then(parse_timestamp),
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockSessionService};

    fn store() -> PendingStore {
        PendingStore::with_database(Database::open_in_memory().unwrap())
    }

    fn settlement(id: &str, minutes: u32) -> PendingSettlement {
        PendingSettlement {
            session_id: SessionId::new(id),
            mode: TimerMode::LongBreak,
            request: SettlementRequest {
                elapsed_minutes: minutes,
                double_credits: false,
            },
        }
    }

    #[test]
    fn test_enqueue_and_list() {
        let store = store();
        let id = store.enqueue(&settlement("focus_a", 3), Some("timeout")).unwrap();

        let records = store.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].settlement, settlement("focus_a", 3));
        assert_eq!(records[0].attempts, 1);
        assert!(records[0].last_attempt.is_some());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_record_attempt_and_delete() {
        let store = store();
        let id = store.enqueue(&settlement("focus_a", 3), None).unwrap();

        store.record_attempt(id, "Server returned 500: boom").unwrap();
        let record = &store.list().unwrap()[0];
        assert_eq!(record.attempts, 2);
        assert_eq!(record.last_error.as_deref(), Some("Server returned 500: boom"));

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_clear() {
        let store = store();
        store.enqueue(&settlement("a", 1), None).unwrap();
        store.enqueue(&settlement("b", 2), None).unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_flush_removes_delivered_and_keeps_failed() {
        let store = store();
        store.enqueue(&settlement("ok", 4), None).unwrap();
        store.enqueue(&settlement("bad", 2), None).unwrap();

        let mut service = MockSessionService::new();
        service
            .expect_end()
            .withf(|id, req| id.as_str() == "ok" && req.elapsed_minutes == 4)
            .times(1)
            .returning(|_, _| {
                Ok(SettlementResult {
                    credits_earned: 4,
                    xp_earned: 40,
                    new_level: 1,
                    streak_days: None,
                })
            });
        service
            .expect_end()
            .withf(|id, _| id.as_str() == "bad")
            .times(1)
            .returning(|_, _| Err(ApiError::Timeout));

        let report = store.flush(&service).await.unwrap();

        assert_eq!(report.settled.len(), 1);
        assert_eq!(report.settled[0].0.as_str(), "ok");
        assert_eq!(report.failed, vec![(SessionId::new("bad"), "Request timed out".to_string())]);

        let remaining = store.list().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].settlement.session_id.as_str(), "bad");
        assert_eq!(remaining[0].attempts, 2);
    }
}
