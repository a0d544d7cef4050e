//! Stock status engine tests
//!
//! Property-based and unit tests for:
//! - Status classification against safety stock and reorder point
//! - Shortage date projection and the remaining-days label
//! - Recommended order quantity

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::stock_status::{
    days_until_shortage, derive_shortage_date, derive_status, recommended_order_quantity,
    DaysUntilShortage, MaterialStatus, StatusCounts,
};
use shared::models::NewMaterial;
use shared::validation::{validate_new_material, MAX_QUANTITY};
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_between_safety_and_reorder_is_low() {
        assert_eq!(
            derive_status(dec("450"), dec("200"), dec("500")),
            MaterialStatus::Low
        );
    }

    #[test]
    fn test_below_safety_is_critical() {
        assert_eq!(
            derive_status(dec("150"), dec("200"), dec("500")),
            MaterialStatus::Critical
        );
    }

    #[test]
    fn test_boundaries_resolve_to_more_severe_status() {
        assert_eq!(
            derive_status(dec("200"), dec("200"), dec("500")),
            MaterialStatus::Critical
        );
        assert_eq!(
            derive_status(dec("500"), dec("200"), dec("500")),
            MaterialStatus::Low
        );
        assert_eq!(
            derive_status(dec("500.01"), dec("200"), dec("500")),
            MaterialStatus::Safe
        );
    }

    #[test]
    fn test_empty_stock_with_zero_thresholds_is_critical() {
        assert_eq!(
            derive_status(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            MaterialStatus::Critical
        );
    }

    #[test]
    fn test_recommended_quantity_covers_lead_time() {
        assert_eq!(
            recommended_order_quantity(7, dec("50"), dec("200"), dec("450")),
            dec("100")
        );
    }

    #[test]
    fn test_recommended_quantity_rounds_up() {
        // 3 * 2.5 + 10 - 12.2 = 5.3
        assert_eq!(
            recommended_order_quantity(3, dec("2.5"), dec("10"), dec("12.2")),
            dec("6")
        );
    }

    #[test]
    fn test_recommended_quantity_zero_when_covered() {
        assert_eq!(
            recommended_order_quantity(7, dec("50"), dec("200"), dec("900")),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_no_usage_means_no_shortage() {
        let shortage = derive_shortage_date(dec("450"), Decimal::ZERO, now());
        assert_eq!(shortage, None);

        let days = days_until_shortage(shortage, now());
        assert_eq!(days, DaysUntilShortage::NotApplicable);
        assert_eq!(days.to_string(), "N/A");
    }

    #[test]
    fn test_shortage_date_truncates_partial_days() {
        // 100 / 30 = 3.33 days of cover
        let shortage = derive_shortage_date(dec("100"), dec("30"), now());
        assert_eq!(shortage, Some(now() + Duration::days(3)));
    }

    #[test]
    fn test_empty_stock_runs_out_today() {
        let shortage = derive_shortage_date(Decimal::ZERO, dec("5"), now());
        assert_eq!(shortage, Some(now()));
        assert_eq!(
            days_until_shortage(shortage, now()),
            DaysUntilShortage::StockOut
        );
    }

    #[test]
    fn test_days_until_shortage_counts_whole_days() {
        let shortage = Some(now() + Duration::days(10));
        let later = now() + Duration::hours(30);

        assert_eq!(
            days_until_shortage(shortage, now()),
            DaysUntilShortage::Days(10)
        );
        assert_eq!(
            days_until_shortage(shortage, later),
            DaysUntilShortage::Days(8)
        );
    }

    #[test]
    fn test_past_shortage_is_stock_out() {
        let shortage = Some(now() - Duration::days(2));
        let days = days_until_shortage(shortage, now());
        assert_eq!(days, DaysUntilShortage::StockOut);
        assert_eq!(days.to_string(), "Stock-out");
    }

    #[test]
    fn test_days_label() {
        assert_eq!(DaysUntilShortage::Days(1).to_string(), "1 day");
        assert_eq!(DaysUntilShortage::Days(14).to_string(), "14 days");
    }

    #[test]
    fn test_huge_cover_does_not_overflow() {
        let shortage = derive_shortage_date(dec("79228162514264337593543950335"), dec("0.0001"), now());
        assert_eq!(shortage, None);
    }

    #[test]
    fn test_order_quantity_saturates_instead_of_overflowing() {
        let qty = recommended_order_quantity(
            30,
            dec("10000000000000000000000000000"),
            Decimal::ZERO,
            Decimal::ZERO,
        );
        assert_eq!(qty, Decimal::MAX);
    }

    #[test]
    fn test_oversized_usage_fails_validation() {
        let mut input = NewMaterial {
            material_code: "GLUE-9".to_string(),
            name: "Hot melt glue".to_string(),
            supplier_id: None,
            warehouse_id: None,
            unit: "kg".to_string(),
            current_quantity: dec("40"),
            reorder_point: dec("25"),
            safety_stock: dec("10"),
            avg_daily_usage: dec("10000000000000000000000000000"),
            lead_time_days: 30,
        };
        assert_eq!(validate_new_material(&input).unwrap_err().0, "avg_daily_usage");

        input.avg_daily_usage = MAX_QUANTITY;
        assert!(validate_new_material(&input).is_ok());
    }

    #[test]
    fn test_status_counts_tally() {
        let counts = StatusCounts::tally([
            MaterialStatus::Critical,
            MaterialStatus::Low,
            MaterialStatus::Low,
            MaterialStatus::Safe,
        ]);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.low, 2);
        assert_eq!(counts.safe, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_status_text_matches_storage_values() {
        for (status, text) in [
            (MaterialStatus::Critical, "critical"),
            (MaterialStatus::Low, "low"),
            (MaterialStatus::Safe, "safe"),
        ] {
            assert_eq!(status.as_str(), text);
            assert_eq!(MaterialStatus::from_str(text).unwrap(), status);
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    /// Quantities from 0.0 to 10000.0
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=100_000i64).prop_map(|n| Decimal::new(n, 1))
    }

    /// Positive daily usage from 0.1 to 500.0
    fn usage_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=5_000i64).prop_map(|n| Decimal::new(n, 1))
    }

    fn lead_time_strategy() -> impl Strategy<Value = i32> {
        1i32..=120
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// At or below safety stock is critical whatever the reorder point
        #[test]
        fn prop_at_or_below_safety_is_critical(
            safety in quantity_strategy(),
            below in quantity_strategy(),
            reorder in quantity_strategy()
        ) {
            let current = (safety - below).max(Decimal::ZERO);
            prop_assert_eq!(derive_status(current, safety, reorder), MaterialStatus::Critical);
        }

        /// Above safety stock is never critical
        #[test]
        fn prop_above_safety_is_not_critical(
            safety in quantity_strategy(),
            extra in usage_strategy(),
            reorder in quantity_strategy()
        ) {
            let status = derive_status(safety + extra, safety, reorder);
            prop_assert_ne!(status, MaterialStatus::Critical);
        }

        /// Recommended quantity is never negative
        #[test]
        fn prop_recommended_quantity_non_negative(
            lead in lead_time_strategy(),
            usage in quantity_strategy(),
            safety in quantity_strategy(),
            current in quantity_strategy()
        ) {
            let qty = recommended_order_quantity(lead, usage, safety, current);
            prop_assert!(qty >= Decimal::ZERO);
            prop_assert_eq!(qty, qty.ceil());
        }

        /// Stock that already covers lead time plus safety needs no order
        #[test]
        fn prop_recommended_quantity_zero_when_covered(
            lead in lead_time_strategy(),
            usage in quantity_strategy(),
            safety in quantity_strategy(),
            surplus in quantity_strategy()
        ) {
            let current = Decimal::from(lead) * usage + safety + surplus;
            prop_assert_eq!(recommended_order_quantity(lead, usage, safety, current), Decimal::ZERO);
        }

        /// Ordering the recommended quantity reaches the target level
        #[test]
        fn prop_recommended_quantity_reaches_target(
            lead in lead_time_strategy(),
            usage in quantity_strategy(),
            safety in quantity_strategy(),
            current in quantity_strategy()
        ) {
            let target = Decimal::from(lead) * usage + safety;
            let qty = recommended_order_quantity(lead, usage, safety, current);
            prop_assert!(current + qty >= target);
        }

        /// Projected shortage is never in the past and is whole days of cover
        #[test]
        fn prop_shortage_date_is_whole_days_of_cover(
            current in quantity_strategy(),
            usage in usage_strategy()
        ) {
            let shortage = derive_shortage_date(current, usage, now());
            prop_assert!(shortage.is_some());
            let days = (shortage.unwrap() - now()).num_days();
            prop_assert!(days >= 0);
            prop_assert!(Decimal::from(days) * usage <= current);
            prop_assert!(Decimal::from(days + 1) * usage > current);
        }

        /// Without usage there is never a shortage
        #[test]
        fn prop_no_usage_no_shortage(current in quantity_strategy()) {
            prop_assert_eq!(derive_shortage_date(current, Decimal::ZERO, now()), None);
        }
    }
}
