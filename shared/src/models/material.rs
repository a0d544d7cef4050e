//! Material models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stock_status::{
    days_until_shortage, derive_shortage_date, derive_status, recommended_order_quantity,
    DaysUntilShortage, MaterialStatus,
};

/// Caller-supplied fields of a material
///
/// Derived stock fields are absent on purpose: they can only be produced
/// by [`Material::recompute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMaterial {
    pub material_code: String,
    pub name: String,
    pub supplier_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub unit: String,
    pub current_quantity: Decimal,
    pub reorder_point: Decimal,
    pub safety_stock: Decimal,
    pub avg_daily_usage: Decimal,
    pub lead_time_days: i32,
}

/// A tracked material and its stock level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    pub id: Uuid,
    pub material_code: String,
    pub name: String,
    pub supplier_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub unit: String,
    pub current_quantity: Decimal,
    pub reorder_point: Decimal,
    pub safety_stock: Decimal,
    pub avg_daily_usage: Decimal,
    pub lead_time_days: i32,
    status: MaterialStatus,
    shortage_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// Build a material and derive its stock fields as of `now`
    pub fn new(id: Uuid, input: NewMaterial, now: DateTime<Utc>) -> Self {
        let mut material = Self::from_input(id, input, None, now, now);
        material.recompute(now);
        material
    }

    /// Rebuild a material loaded from storage.
    ///
    /// The status is re-derived from the stored quantities. The shortage
    /// date is anchored to the time of the last mutation, so the stored
    /// value is kept as written.
    pub fn restore(
        id: Uuid,
        input: NewMaterial,
        shortage_date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut material = Self::from_input(id, input, shortage_date, created_at, updated_at);
        material.status = derive_status(
            material.current_quantity,
            material.safety_stock,
            material.reorder_point,
        );
        material
    }

    fn from_input(
        id: Uuid,
        input: NewMaterial,
        shortage_date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            material_code: input.material_code,
            name: input.name,
            supplier_id: input.supplier_id,
            warehouse_id: input.warehouse_id,
            unit: input.unit,
            current_quantity: input.current_quantity,
            reorder_point: input.reorder_point,
            safety_stock: input.safety_stock,
            avg_daily_usage: input.avg_daily_usage,
            lead_time_days: input.lead_time_days,
            status: MaterialStatus::Safe,
            shortage_date,
            created_at,
            updated_at,
        }
    }

    pub fn status(&self) -> MaterialStatus {
        self.status
    }

    pub fn shortage_date(&self) -> Option<DateTime<Utc>> {
        self.shortage_date
    }

    /// Re-derive status and shortage date from the current numeric fields
    pub fn recompute(&mut self, now: DateTime<Utc>) {
        self.status = derive_status(self.current_quantity, self.safety_stock, self.reorder_point);
        self.shortage_date = derive_shortage_date(self.current_quantity, self.avg_daily_usage, now);
        self.updated_at = now;
    }

    /// Replace the editable fields and re-derive. Quantity changes go through the ledger.
    pub fn apply_update(&mut self, update: MaterialUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(supplier_id) = update.supplier_id {
            self.supplier_id = supplier_id;
        }
        if let Some(warehouse_id) = update.warehouse_id {
            self.warehouse_id = warehouse_id;
        }
        if let Some(unit) = update.unit {
            self.unit = unit;
        }
        if let Some(reorder_point) = update.reorder_point {
            self.reorder_point = reorder_point;
        }
        if let Some(safety_stock) = update.safety_stock {
            self.safety_stock = safety_stock;
        }
        if let Some(avg_daily_usage) = update.avg_daily_usage {
            self.avg_daily_usage = avg_daily_usage;
        }
        if let Some(lead_time_days) = update.lead_time_days {
            self.lead_time_days = lead_time_days;
        }
        self.recompute(now);
    }

    pub fn days_until_shortage(&self, now: DateTime<Utc>) -> DaysUntilShortage {
        days_until_shortage(self.shortage_date, now)
    }

    pub fn recommended_order_quantity(&self) -> Decimal {
        recommended_order_quantity(
            self.lead_time_days,
            self.avg_daily_usage,
            self.safety_stock,
            self.current_quantity,
        )
    }

    /// Snapshot including the read-time figures shown on the dashboard
    pub fn view(&self, now: DateTime<Utc>) -> MaterialView {
        MaterialView {
            material: self.clone(),
            days_until_shortage: self.days_until_shortage(now),
            recommended_order_qty: self.recommended_order_quantity(),
        }
    }
}

/// Partial update of a material's editable fields
///
/// `supplier_id` and `warehouse_id` use a nested option so a caller can
/// detach the reference (`Some(None)`) as well as leave it (`None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialUpdate {
    pub name: Option<String>,
    pub supplier_id: Option<Option<Uuid>>,
    pub warehouse_id: Option<Option<Uuid>>,
    pub unit: Option<String>,
    pub reorder_point: Option<Decimal>,
    pub safety_stock: Option<Decimal>,
    pub avg_daily_usage: Option<Decimal>,
    pub lead_time_days: Option<i32>,
}

/// Material as returned to API clients
#[derive(Debug, Clone, Serialize)]
pub struct MaterialView {
    #[serde(flatten)]
    pub material: Material,
    pub days_until_shortage: DaysUntilShortage,
    pub recommended_order_qty: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap()
    }

    fn steel_input() -> NewMaterial {
        NewMaterial {
            material_code: "STL-001".to_string(),
            name: "Steel sheet".to_string(),
            supplier_id: None,
            warehouse_id: None,
            unit: "kg".to_string(),
            current_quantity: Decimal::from(450),
            reorder_point: Decimal::from(500),
            safety_stock: Decimal::from(200),
            avg_daily_usage: Decimal::from(50),
            lead_time_days: 7,
        }
    }

    #[test]
    fn test_new_material_derives_fields() {
        let material = Material::new(Uuid::nil(), steel_input(), now());
        assert_eq!(material.status(), MaterialStatus::Low);
        assert_eq!(material.shortage_date(), Some(now() + Duration::days(9)));
        assert_eq!(material.recommended_order_quantity(), Decimal::from(100));
        assert_eq!(material.days_until_shortage(now()), DaysUntilShortage::Days(9));
    }

    #[test]
    fn test_restore_rederives_status() {
        let stored_shortage = Some(now() + Duration::days(2));
        let mut input = steel_input();
        input.current_quantity = Decimal::from(100);

        let material = Material::restore(Uuid::nil(), input, stored_shortage, now(), now());
        assert_eq!(material.status(), MaterialStatus::Critical);
        assert_eq!(material.shortage_date(), stored_shortage);
    }

    #[test]
    fn test_update_recomputes_status() {
        let mut material = Material::new(Uuid::nil(), steel_input(), now());
        let later = now() + Duration::days(1);

        material.apply_update(
            MaterialUpdate {
                reorder_point: Some(Decimal::from(400)),
                avg_daily_usage: Some(Decimal::ZERO),
                ..Default::default()
            },
            later,
        );

        assert_eq!(material.status(), MaterialStatus::Safe);
        assert_eq!(material.shortage_date(), None);
        assert_eq!(material.updated_at, later);
        assert_eq!(material.days_until_shortage(later).to_string(), "N/A");
    }

    #[test]
    fn test_update_can_detach_supplier() {
        let mut input = steel_input();
        input.supplier_id = Some(Uuid::new_v4());
        let mut material = Material::new(Uuid::nil(), input, now());

        material.apply_update(
            MaterialUpdate {
                supplier_id: Some(None),
                ..Default::default()
            },
            now(),
        );
        assert_eq!(material.supplier_id, None);
    }

    #[test]
    fn test_view_serializes_flat() {
        let material = Material::new(Uuid::nil(), steel_input(), now());
        let json = serde_json::to_value(material.view(now())).unwrap();
        assert_eq!(json["material_code"], "STL-001");
        assert_eq!(json["status"], "low");
        assert_eq!(json["days_until_shortage"]["days"], 9);
        assert_eq!(json["recommended_order_qty"], "100");
    }
}
