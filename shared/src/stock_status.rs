//! Stock status derivation
//!
//! Every write path that touches a material's numeric fields goes through
//! these functions, so the persisted `status` and `shortage_date` always
//! agree with the quantities they were derived from.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Alert state of a material's stock level
///
/// Variants are declared from most to least severe, so the derived `Ord`
/// sorts critical materials first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialStatus {
    /// At or below safety stock
    Critical,
    /// Above safety stock, at or below the reorder point
    Low,
    Safe,
}

impl MaterialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialStatus::Critical => "critical",
            MaterialStatus::Low => "low",
            MaterialStatus::Safe => "safe",
        }
    }

    /// Whether the material belongs on the reorder report
    pub fn needs_reorder(&self) -> bool {
        matches!(self, MaterialStatus::Critical | MaterialStatus::Low)
    }
}

impl fmt::Display for MaterialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(MaterialStatus::Critical),
            "low" => Ok(MaterialStatus::Low),
            "safe" => Ok(MaterialStatus::Safe),
            other => Err(format!("Unknown material status: {}", other)),
        }
    }
}

/// Remaining days of cover as shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "days", rename_all = "snake_case")]
pub enum DaysUntilShortage {
    /// No usage trend, so no projected shortage
    NotApplicable,
    /// Projected shortage is today or already past
    StockOut,
    Days(i64),
}

impl fmt::Display for DaysUntilShortage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaysUntilShortage::NotApplicable => write!(f, "N/A"),
            DaysUntilShortage::StockOut => write!(f, "Stock-out"),
            DaysUntilShortage::Days(1) => write!(f, "1 day"),
            DaysUntilShortage::Days(n) => write!(f, "{} days", n),
        }
    }
}

/// Classify a stock level. Equality resolves to the more severe state.
pub fn derive_status(
    current_quantity: Decimal,
    safety_stock: Decimal,
    reorder_point: Decimal,
) -> MaterialStatus {
    if current_quantity <= safety_stock {
        MaterialStatus::Critical
    } else if current_quantity <= reorder_point {
        MaterialStatus::Low
    } else {
        MaterialStatus::Safe
    }
}

/// Project the date the quantity runs out at the current usage rate.
///
/// Whole days of cover only: the fractional remainder is truncated.
/// Returns `None` without a positive usage rate, or when the projection
/// falls outside the representable date range.
pub fn derive_shortage_date(
    current_quantity: Decimal,
    avg_daily_usage: Decimal,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if avg_daily_usage <= Decimal::ZERO {
        return None;
    }

    let days = current_quantity
        .checked_div(avg_daily_usage)?
        .floor()
        .to_i64()?;

    now.checked_add_signed(Duration::try_days(days)?)
}

/// Whole days between `now` and the projected shortage
pub fn days_until_shortage(
    shortage_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DaysUntilShortage {
    let Some(shortage_date) = shortage_date else {
        return DaysUntilShortage::NotApplicable;
    };

    // num_days truncates toward zero; it only differs from floor for
    // negative spans, which all report as stock-out anyway.
    match (shortage_date - now).num_days() {
        days if days <= 0 => DaysUntilShortage::StockOut,
        days => DaysUntilShortage::Days(days),
    }
}

/// Quantity to order so stock covers the supplier lead time plus safety stock.
///
/// A target too large to represent saturates at `Decimal::MAX`.
pub fn recommended_order_quantity(
    lead_time_days: i32,
    avg_daily_usage: Decimal,
    safety_stock: Decimal,
    current_quantity: Decimal,
) -> Decimal {
    Decimal::from(lead_time_days)
        .checked_mul(avg_daily_usage)
        .and_then(|usage| usage.checked_add(safety_stock))
        .and_then(|target| target.checked_sub(current_quantity))
        .map(|shortfall| shortfall.ceil().max(Decimal::ZERO))
        .unwrap_or(Decimal::MAX)
}

/// Number of materials in each status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub critical: i64,
    pub low: i64,
    pub safe: i64,
}

impl StatusCounts {
    pub fn tally<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = MaterialStatus>,
    {
        statuses.into_iter().fold(Self::default(), |mut counts, status| {
            match status {
                MaterialStatus::Critical => counts.critical += 1,
                MaterialStatus::Low => counts.low += 1,
                MaterialStatus::Safe => counts.safe += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> i64 {
        self.critical + self.low + self.safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(derive_status(dec(450), dec(200), dec(500)), MaterialStatus::Low);
        assert_eq!(derive_status(dec(150), dec(200), dec(500)), MaterialStatus::Critical);
        assert_eq!(derive_status(dec(501), dec(200), dec(500)), MaterialStatus::Safe);
    }

    #[test]
    fn test_status_ties_favor_severity() {
        assert_eq!(derive_status(dec(200), dec(200), dec(500)), MaterialStatus::Critical);
        assert_eq!(derive_status(dec(500), dec(200), dec(500)), MaterialStatus::Low);
    }

    #[test]
    fn test_status_critical_when_reorder_below_safety() {
        assert_eq!(derive_status(dec(90), dec(100), dec(50)), MaterialStatus::Critical);
        assert_eq!(derive_status(dec(120), dec(100), dec(50)), MaterialStatus::Safe);
    }

    #[test]
    fn test_shortage_date_truncates_fraction() {
        // 450 / 60 = 7.5 days of cover
        let date = derive_shortage_date(dec(450), dec(60), now()).unwrap();
        assert_eq!(date, now() + Duration::days(7));
    }

    #[test]
    fn test_shortage_date_without_usage() {
        assert_eq!(derive_shortage_date(dec(450), Decimal::ZERO, now()), None);
        assert_eq!(derive_shortage_date(dec(450), dec(-1), now()), None);
    }

    #[test]
    fn test_shortage_date_empty_stock_is_today() {
        assert_eq!(derive_shortage_date(Decimal::ZERO, dec(5), now()), Some(now()));
    }

    #[test]
    fn test_shortage_date_out_of_range() {
        let tiny_usage = Decimal::new(1, 20);
        assert_eq!(derive_shortage_date(dec(1_000_000), tiny_usage, now()), None);
    }

    #[test]
    fn test_days_until_shortage() {
        assert_eq!(days_until_shortage(None, now()), DaysUntilShortage::NotApplicable);
        assert_eq!(
            days_until_shortage(Some(now() + Duration::days(9)), now()),
            DaysUntilShortage::Days(9)
        );
        assert_eq!(
            days_until_shortage(Some(now() + Duration::hours(30)), now()),
            DaysUntilShortage::Days(1)
        );
        assert_eq!(days_until_shortage(Some(now()), now()), DaysUntilShortage::StockOut);
        assert_eq!(
            days_until_shortage(Some(now() - Duration::days(3)), now()),
            DaysUntilShortage::StockOut
        );
        assert_eq!(
            days_until_shortage(Some(now() + Duration::hours(20)), now()),
            DaysUntilShortage::StockOut
        );
    }

    #[test]
    fn test_days_until_shortage_display() {
        assert_eq!(DaysUntilShortage::NotApplicable.to_string(), "N/A");
        assert_eq!(DaysUntilShortage::StockOut.to_string(), "Stock-out");
        assert_eq!(DaysUntilShortage::Days(1).to_string(), "1 day");
        assert_eq!(DaysUntilShortage::Days(12).to_string(), "12 days");
    }

    #[test]
    fn test_recommended_order_quantity() {
        assert_eq!(recommended_order_quantity(7, dec(50), dec(200), dec(450)), dec(100));
        assert_eq!(recommended_order_quantity(7, dec(50), dec(200), dec(600)), Decimal::ZERO);
        assert_eq!(recommended_order_quantity(7, dec(50), dec(200), dec(900)), Decimal::ZERO);
    }

    #[test]
    fn test_recommended_order_quantity_rounds_up() {
        // 3 * 2.5 + 10 - 12 = 5.5
        let usage = Decimal::new(25, 1);
        assert_eq!(recommended_order_quantity(3, usage, dec(10), dec(12)), dec(6));
    }

    #[test]
    fn test_recommended_order_quantity_saturates() {
        let usage: Decimal = "10000000000000000000000000000".parse().unwrap();
        assert_eq!(recommended_order_quantity(30, usage, dec(0), dec(0)), Decimal::MAX);
        assert_eq!(recommended_order_quantity(1, Decimal::MAX, Decimal::MAX, dec(0)), Decimal::MAX);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [MaterialStatus::Critical, MaterialStatus::Low, MaterialStatus::Safe] {
            assert_eq!(status.as_str().parse::<MaterialStatus>().unwrap(), status);
        }
        assert!("unknown".parse::<MaterialStatus>().is_err());
    }

    #[test]
    fn test_status_ordering_is_by_severity() {
        assert!(MaterialStatus::Critical < MaterialStatus::Low);
        assert!(MaterialStatus::Low < MaterialStatus::Safe);
    }

    #[test]
    fn test_days_until_shortage_serialization() {
        let json = serde_json::to_value(DaysUntilShortage::Days(4)).unwrap();
        assert_eq!(json, serde_json::json!({"state": "days", "days": 4}));
        let json = serde_json::to_value(DaysUntilShortage::NotApplicable).unwrap();
        assert_eq!(json, serde_json::json!({"state": "not_applicable"}));
    }

    #[test]
    fn test_status_counts() {
        let counts = StatusCounts::tally([
            MaterialStatus::Critical,
            MaterialStatus::Safe,
            MaterialStatus::Low,
            MaterialStatus::Critical,
        ]);
        assert_eq!(counts, StatusCounts { critical: 2, low: 1, safe: 1 });
        assert_eq!(counts.total(), 4);
    }
}
