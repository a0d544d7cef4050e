//! Stock adjustment ledger
//!
//! Applies a signed quantity change to a material and produces the history
//! entry that records it. Nothing here touches storage: the caller persists
//! the returned material and entry together in one transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Material, NewStockHistoryEntry, StockReason};

/// Reasons an adjustment is refused before anything is written
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Adjustment of {delta} would take quantity {current} below zero")]
    InvalidAdjustment { current: Decimal, delta: Decimal },

    #[error("Adjustment of {delta} would take quantity {current} out of range")]
    QuantityOverflow { current: Decimal, delta: Decimal },

    #[error("An authenticated user is required to adjust stock")]
    Unauthenticated,
}

/// Result of a successful adjustment
#[derive(Debug, Clone, PartialEq)]
pub struct StockAdjustment {
    /// Copy of the material with the new quantity and re-derived stock fields
    pub material: Material,
    pub entry: NewStockHistoryEntry,
}

/// Apply `delta` to `material`.
///
/// The input material is left untouched; on error nothing is produced.
pub fn apply_adjustment(
    material: &Material,
    delta: Decimal,
    reason: StockReason,
    actor: Option<Uuid>,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> Result<StockAdjustment, LedgerError> {
    let user_id = actor.ok_or(LedgerError::Unauthenticated)?;

    let quantity_before = material.current_quantity;
    let quantity_after = quantity_before.checked_add(delta).ok_or(
        LedgerError::QuantityOverflow {
            current: quantity_before,
            delta,
        },
    )?;
    if quantity_after < Decimal::ZERO {
        return Err(LedgerError::InvalidAdjustment {
            current: quantity_before,
            delta,
        });
    }

    let mut updated = material.clone();
    updated.current_quantity = quantity_after;
    updated.recompute(now);

    let notes = notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    Ok(StockAdjustment {
        material: updated,
        entry: NewStockHistoryEntry {
            material_id: material.id,
            user_id,
            quantity_before,
            quantity_after,
            quantity_change: delta,
            reason,
            notes,
            created_at: now,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewMaterial;
    use crate::stock_status::MaterialStatus;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap()
    }

    fn resin() -> Material {
        Material::new(
            Uuid::new_v4(),
            NewMaterial {
                material_code: "RSN-010".to_string(),
                name: "Epoxy resin".to_string(),
                supplier_id: None,
                warehouse_id: None,
                unit: "l".to_string(),
                current_quantity: Decimal::from(450),
                reorder_point: Decimal::from(500),
                safety_stock: Decimal::from(200),
                avg_daily_usage: Decimal::from(50),
                lead_time_days: 7,
            },
            now(),
        )
    }

    #[test]
    fn test_purchase_raises_quantity_and_status() {
        let material = resin();
        let actor = Uuid::new_v4();
        let later = now() + Duration::hours(1);

        let result = apply_adjustment(
            &material,
            Decimal::from(100),
            StockReason::Purchase,
            Some(actor),
            Some("  PO-7781 ".to_string()),
            later,
        )
        .unwrap();

        assert_eq!(result.material.current_quantity, Decimal::from(550));
        assert_eq!(result.material.status(), MaterialStatus::Safe);
        assert_eq!(result.material.shortage_date(), Some(later + Duration::days(11)));
        assert_eq!(result.entry.quantity_before, Decimal::from(450));
        assert_eq!(result.entry.quantity_after, Decimal::from(550));
        assert_eq!(result.entry.quantity_change, Decimal::from(100));
        assert_eq!(result.entry.user_id, actor);
        assert_eq!(result.entry.material_id, material.id);
        assert_eq!(result.entry.notes.as_deref(), Some("PO-7781"));
        assert_eq!(result.entry.created_at, later);
    }

    #[test]
    fn test_draw_down_to_zero_is_allowed() {
        let material = resin();
        let result = apply_adjustment(
            &material,
            Decimal::from(-450),
            StockReason::ProductionUse,
            Some(Uuid::new_v4()),
            None,
            now(),
        )
        .unwrap();

        assert_eq!(result.material.current_quantity, Decimal::ZERO);
        assert_eq!(result.material.status(), MaterialStatus::Critical);
        assert_eq!(result.material.shortage_date(), Some(now()));
    }

    #[test]
    fn test_rejects_negative_result() {
        let material = resin();
        let err = apply_adjustment(
            &material,
            Decimal::from(-451),
            StockReason::Damage,
            Some(Uuid::new_v4()),
            None,
            now(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            LedgerError::InvalidAdjustment {
                current: Decimal::from(450),
                delta: Decimal::from(-451),
            }
        );
        assert_eq!(material.current_quantity, Decimal::from(450));
    }

    #[test]
    fn test_requires_actor_before_anything_else() {
        let material = resin();
        let err = apply_adjustment(
            &material,
            Decimal::from(-10_000),
            StockReason::Adjustment,
            None,
            None,
            now(),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::Unauthenticated);
    }

    #[test]
    fn test_zero_delta_is_recorded() {
        let result = apply_adjustment(
            &resin(),
            Decimal::ZERO,
            StockReason::Adjustment,
            Some(Uuid::new_v4()),
            Some("cycle count matched".to_string()),
            now(),
        )
        .unwrap();
        assert_eq!(result.material.current_quantity, Decimal::from(450));
        assert_eq!(result.entry.quantity_before, result.entry.quantity_after);
        assert_eq!(result.entry.quantity_change, Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_receipt_is_rejected() {
        let mut material = resin();
        material.current_quantity = Decimal::MAX;
        let err = apply_adjustment(
            &material,
            Decimal::ONE,
            StockReason::Purchase,
            Some(Uuid::new_v4()),
            None,
            now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LedgerError::QuantityOverflow {
                current: Decimal::MAX,
                delta: Decimal::ONE,
            }
        );
    }

    #[test]
    fn test_blank_notes_are_dropped() {
        let result = apply_adjustment(
            &resin(),
            Decimal::from(5),
            StockReason::Return,
            Some(Uuid::new_v4()),
            Some("   ".to_string()),
            now(),
        )
        .unwrap();
        assert_eq!(result.entry.notes, None);
    }
}
