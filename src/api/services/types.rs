use serde::Serialize;

use crate::geo::{RefreshOutcome, SnapshotStats};

/// 错误响应体：`{"error": "..."}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
    pub dataset: SnapshotStats,
    pub response_time_ms: u32,
}

/// 手动刷新响应
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub outcome: &'static str,
    pub digest: String,
    pub loaded_at: String,
}

pub fn outcome_label(outcome: &RefreshOutcome) -> &'static str {
    match outcome {
        RefreshOutcome::UnchangedByHashCheck => "unchanged_by_hash_check",
        RefreshOutcome::UnchangedByContent => "unchanged_by_content",
        RefreshOutcome::Updated { .. } => "updated",
    }
}
