use crate::error::{AppError, AppResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Where a rate change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateChangeSource {
    Manual,
    Suggestion,
    BulkSuggestion,
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub timestamp: i64,
    pub action: String, // "rate_update", "competitor_added", "competitor_removed", "series_seeded"
    pub date: Option<NaiveDate>,
    pub details: serde_json::Value,
}

/// Append-only JSON-lines trail of rate and compset changes
pub struct AuditTrailService {
    log_file: PathBuf,
    file_handle: Arc<Mutex<std::fs::File>>,
}

impl AuditTrailService {
    /// Create a new audit trail service
    pub fn new(log_directory: PathBuf) -> AppResult<Self> {
        std::fs::create_dir_all(&log_directory)
            .map_err(|e| AppError::Message(format!("Failed to create log directory: {}", e)))?;

        // One file per day
        let date = chrono::Utc::now().format("%Y-%m-%d");
        let log_file = log_directory.join(format!("audit_{}.log", date));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map_err(|e| AppError::Message(format!("Failed to open audit log file: {}", e)))?;

        info!("Audit trail initialized: {:?}", log_file);

        Ok(Self {
            log_file,
            file_handle: Arc::new(Mutex::new(file)),
        })
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Log an audit entry
    pub async fn log(&self, entry: AuditLogEntry) -> AppResult<()> {
        let json = serde_json::to_string(&entry)?;

        let mut file = self.file_handle.lock().await;
        writeln!(file, "{}", json)
            .map_err(|e| AppError::Message(format!("Failed to write audit log: {}", e)))?;

        file.flush()
            .map_err(|e| AppError::Message(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Log an acknowledged ADR change
    pub async fn log_rate_change(
        &self,
        date: NaiveDate,
        old_rate: Decimal,
        new_rate: Decimal,
        source: RateChangeSource,
    ) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            action: "rate_update".to_string(),
            date: Some(date),
            details: serde_json::json!({
                "old_rate": old_rate.to_string(),
                "new_rate": new_rate.to_string(),
                "source": source,
            }),
        };

        self.log(entry).await
    }

    /// Log a compset change
    pub async fn log_competitor_change(
        &self,
        action: &str,
        competitor_id: &str,
        name: &str,
    ) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            action: action.to_string(),
            date: None,
            details: serde_json::json!({
                "competitor_id": competitor_id,
                "name": name,
            }),
        };

        self.log(entry).await
    }

    /// Log a reseed of the whole series
    pub async fn log_series_seeded(&self, days: usize) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            action: "series_seeded".to_string(),
            date: None,
            details: serde_json::json!({ "days": days }),
        };

        self.log(entry).await
    }
}
