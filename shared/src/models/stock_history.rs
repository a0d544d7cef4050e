//! Stock history models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a stock level changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockReason {
    Purchase,
    ProductionUse,
    Adjustment,
    Damage,
    Return,
}

impl StockReason {
    pub const ALL: [StockReason; 5] = [
        StockReason::Purchase,
        StockReason::ProductionUse,
        StockReason::Adjustment,
        StockReason::Damage,
        StockReason::Return,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockReason::Purchase => "purchase",
            StockReason::ProductionUse => "production_use",
            StockReason::Adjustment => "adjustment",
            StockReason::Damage => "damage",
            StockReason::Return => "return",
        }
    }
}

impl fmt::Display for StockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StockReason::ALL
            .into_iter()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| format!("Unknown stock reason: {}", s))
    }
}

/// Ledger entry produced by an adjustment, before storage assigns its id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewStockHistoryEntry {
    pub material_id: Uuid,
    pub user_id: Uuid,
    pub quantity_before: Decimal,
    pub quantity_after: Decimal,
    pub quantity_change: Decimal,
    pub reason: StockReason,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Immutable record of one stock adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHistoryEntry {
    pub id: Uuid,
    pub material_id: Uuid,
    pub user_id: Uuid,
    pub quantity_before: Decimal,
    pub quantity_after: Decimal,
    pub quantity_change: Decimal,
    pub reason: StockReason,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StockHistoryEntry {
    pub fn from_new(id: Uuid, entry: NewStockHistoryEntry) -> Self {
        Self {
            id,
            material_id: entry.material_id,
            user_id: entry.user_id,
            quantity_before: entry.quantity_before,
            quantity_after: entry.quantity_after,
            quantity_change: entry.quantity_change,
            reason: entry.reason,
            notes: entry.notes,
            created_at: entry.created_at,
        }
    }

    /// `after = before + change` and `after >= 0`
    pub fn is_consistent(&self) -> bool {
        self.quantity_after == self.quantity_before + self.quantity_change
            && self.quantity_after >= Decimal::ZERO
    }
}

/// Sum of signed changes across entries
pub fn net_change<'a, I>(entries: I) -> Decimal
where
    I: IntoIterator<Item = &'a StockHistoryEntry>,
{
    entries.into_iter().map(|e| e.quantity_change).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_round_trip() {
        for reason in StockReason::ALL {
            assert_eq!(reason.as_str().parse::<StockReason>().unwrap(), reason);
        }
        assert!("theft".parse::<StockReason>().is_err());
    }

    #[test]
    fn test_reason_serde_names() {
        let json = serde_json::to_string(&StockReason::ProductionUse).unwrap();
        assert_eq!(json, "\"production_use\"");
        let parsed: StockReason = serde_json::from_str("\"return\"").unwrap();
        assert_eq!(parsed, StockReason::Return);
    }
}
