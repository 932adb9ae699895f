//! # Result Store
//!
//! Process-wide map from Telegram user id to the last solved task. Shared
//! between the bot dispatcher and the web viewer as `Arc<ResultStore>`.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

pub const MISSING_TASK: &str = "Дані відсутні";
pub const MISSING_SOLUTION: &str = "Рішення недоступне";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionRecord {
    pub user_id: u64,
    pub task: String,
    pub solution: String,
    pub created_at: DateTime<Utc>,
}

impl SolutionRecord {
    /// Record returned for users that never submitted anything
    pub fn placeholder(user_id: u64) -> Self {
        Self {
            user_id,
            task: MISSING_TASK.to_string(),
            solution: MISSING_SOLUTION.to_string(),
            created_at: DateTime::<Utc>::default(),
        }
    }
}

/// In-memory store, one record per user, last write wins.
///
/// Writes hold the write lock for the whole insert, so two submissions for
/// the same user are applied one after the other.
#[derive(Debug, Default)]
pub struct ResultStore {
    records: RwLock<HashMap<u64, SolutionRecord>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(
        &self,
        user_id: u64,
        task: impl Into<String>,
        solution: impl Into<String>,
    ) -> SolutionRecord {
        let record = SolutionRecord {
            user_id,
            task: task.into(),
            solution: solution.into(),
            created_at: Utc::now(),
        };

        let previous = self
            .records
            .write()
            .await
            .insert(user_id, record.clone());
        debug!(
            user_id,
            overwritten = previous.is_some(),
            "Stored solution record"
        );

        record
    }

    pub async fn lookup(&self, user_id: u64) -> Option<SolutionRecord> {
        self.records.read().await.get(&user_id).cloned()
    }

    /// Stored record or the placeholder when the user has none
    pub async fn get(&self, user_id: u64) -> SolutionRecord {
        self.lookup(user_id)
            .await
            .unwrap_or_else(|| SolutionRecord::placeholder(user_id))
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
