//! Disapproval records and the process-wide disapproval history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::reference::Reference;

/// Why a user rejected a visible reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisapprovalReason {
    /// Too old for the claim
    NotNew,
    /// Does not support the claim
    NotRelevant,
    /// Not influential enough
    LowImpact,
    /// Comes from a source the user does not want cited
    UnwantedSource,
}

impl DisapprovalReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotNew => "not recent enough",
            Self::NotRelevant => "not relevant",
            Self::LowImpact => "low impact",
            Self::UnwantedSource => "unwanted source",
        }
    }
}

impl std::str::FromStr for DisapprovalReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "not_new" | "old" => Ok(Self::NotNew),
            "not_relevant" | "irrelevant" => Ok(Self::NotRelevant),
            "low_impact" => Ok(Self::LowImpact),
            "unwanted_source" | "source" => Ok(Self::UnwantedSource),
            other => Err(format!(
                "unknown disapproval reason '{other}' (expected not-new, not-relevant, low-impact, unwanted-source)"
            )),
        }
    }
}

/// A single rejection of a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisapprovalRecord {
    pub reference: Reference,
    pub reason: DisapprovalReason,
    pub timestamp: DateTime<Utc>,
}

impl DisapprovalRecord {
    pub fn new(reference: Reference, reason: DisapprovalReason) -> Self {
        Self {
            reference,
            reason,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only log of every disapproval in this process.
///
/// Cloning shares the same log. Entries are never mutated or removed.
#[derive(Debug, Clone, Default)]
pub struct DisapprovalHistory {
    records: Arc<RwLock<Vec<DisapprovalRecord>>>,
}

impl DisapprovalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub async fn append(&self, record: DisapprovalRecord) {
        self.records.write().await.push(record);
    }

    /// Returns a copy of every record, oldest first.
    pub async fn snapshot(&self) -> Vec<DisapprovalRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_from_str() {
        assert_eq!("not-new".parse::<DisapprovalReason>(), Ok(DisapprovalReason::NotNew));
        assert_eq!("Low Impact".parse::<DisapprovalReason>(), Ok(DisapprovalReason::LowImpact));
        assert_eq!(
            "unwanted_source".parse::<DisapprovalReason>(),
            Ok(DisapprovalReason::UnwantedSource)
        );
        assert!("nope".parse::<DisapprovalReason>().is_err());
    }

    #[tokio::test]
    async fn test_history_is_shared_and_append_only() {
        let history = DisapprovalHistory::new();
        let shared = history.clone();

        history
            .append(DisapprovalRecord::new(Reference::default(), DisapprovalReason::NotRelevant))
            .await;
        shared
            .append(DisapprovalRecord::new(Reference::default(), DisapprovalReason::LowImpact))
            .await;

        let records = history.snapshot().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].reason, DisapprovalReason::NotRelevant);
        assert_eq!(records[1].reason, DisapprovalReason::LowImpact);
        assert!(!shared.is_empty().await);
    }
}
