//! WebAssembly module for the Materials Inventory Platform
//!
//! Lets the browser preview stock status, shortage countdowns and reorder
//! quantities with the same rules the server applies. Quantities cross the
//! boundary as decimal strings so no precision is lost to `f64`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::stock_status::*;
pub use shared::validation::*;

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|e| format!("Invalid {}: {}", field, e))
}

fn from_millis(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms as i64)
}

/// Report an input problem to the console and hand it back to the caller
fn reject(message: String) -> JsValue {
    let value = JsValue::from_str(&message);
    web_sys::console::warn_1(&value);
    value
}

fn status_of(current: &str, safety: &str, reorder: &str) -> Result<MaterialStatus, String> {
    Ok(derive_status(
        parse_decimal("current_quantity", current)?,
        parse_decimal("safety_stock", safety)?,
        parse_decimal("reorder_point", reorder)?,
    ))
}

fn order_qty_of(lead_time_days: i32, usage: &str, safety: &str, current: &str) -> Result<Decimal, String> {
    validate_lead_time(lead_time_days)?;
    Ok(recommended_order_quantity(
        lead_time_days,
        parse_decimal("avg_daily_usage", usage)?,
        parse_decimal("safety_stock", safety)?,
        parse_decimal("current_quantity", current)?,
    ))
}

fn shortage_of(current: &str, usage: &str, now_ms: f64) -> Result<Option<f64>, String> {
    let now = from_millis(now_ms).ok_or_else(|| "Invalid timestamp".to_string())?;
    let shortage = derive_shortage_date(
        parse_decimal("current_quantity", current)?,
        parse_decimal("avg_daily_usage", usage)?,
        now,
    );
    Ok(shortage.map(|d| d.timestamp_millis() as f64))
}

fn label_of(shortage_ms: Option<f64>, now_ms: f64) -> String {
    let Some(now) = from_millis(now_ms) else {
        return DaysUntilShortage::NotApplicable.to_string();
    };
    days_until_shortage(shortage_ms.and_then(from_millis), now).to_string()
}

fn check_material(json: &str) -> Result<(), String> {
    let input: NewMaterial =
        serde_json::from_str(json).map_err(|e| format!("Invalid material JSON: {}", e))?;
    validate_new_material(&input).map_err(|(field, message)| format!("{}: {}", field, message))
}

/// Classify a stock level as "critical", "low" or "safe"
#[wasm_bindgen]
pub fn derive_material_status(current: &str, safety: &str, reorder: &str) -> Result<String, JsValue> {
    status_of(current, safety, reorder)
        .map(|s| s.as_str().to_string())
        .map_err(reject)
}

/// Quantity to order to cover lead time plus safety stock, as a decimal string
#[wasm_bindgen]
pub fn recommended_order_qty(
    lead_time_days: i32,
    avg_daily_usage: &str,
    safety_stock: &str,
    current_quantity: &str,
) -> Result<String, JsValue> {
    order_qty_of(lead_time_days, avg_daily_usage, safety_stock, current_quantity)
        .map(|q| q.to_string())
        .map_err(reject)
}

/// Projected shortage as epoch milliseconds, or `undefined` without usage
#[wasm_bindgen]
pub fn project_shortage_ms(current: &str, avg_daily_usage: &str, now_ms: f64) -> Result<Option<f64>, JsValue> {
    shortage_of(current, avg_daily_usage, now_ms).map_err(reject)
}

/// Remaining-days label ("N/A", "Stock-out", "3 days") for a shortage timestamp
#[wasm_bindgen]
pub fn days_until_shortage_label(shortage_ms: Option<f64>, now_ms: f64) -> String {
    label_of(shortage_ms, now_ms)
}

/// Same as [`days_until_shortage_label`] against the browser clock
#[wasm_bindgen]
pub fn days_until_shortage_from_now(shortage_ms: Option<f64>) -> String {
    label_of(shortage_ms, js_sys::Date::now())
}

/// Validate a material form before it is submitted
#[wasm_bindgen]
pub fn validate_material(json: &str) -> Result<(), JsValue> {
    check_material(json).map_err(reject)
}
