//! Reorder selection for the replenishment report

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::Material;
use crate::stock_status::{DaysUntilShortage, MaterialStatus};

/// Materials that need attention: critical first, then low, each tier by code.
///
/// Computed fresh on every call.
pub fn select_for_reorder<I>(materials: I) -> Vec<Material>
where
    I: IntoIterator<Item = Material>,
{
    let mut selected: Vec<Material> = materials
        .into_iter()
        .filter(|m| m.status().needs_reorder())
        .collect();

    selected.sort_by(|a, b| {
        a.status()
            .cmp(&b.status())
            .then_with(|| a.material_code.cmp(&b.material_code))
    });
    selected
}

/// One row of the reorder report
#[derive(Debug, Clone, Serialize)]
pub struct ReorderLine {
    pub material_id: Uuid,
    pub material_code: String,
    pub name: String,
    pub unit: String,
    pub supplier_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub status: MaterialStatus,
    pub current_quantity: Decimal,
    pub reorder_point: Decimal,
    pub safety_stock: Decimal,
    pub shortage_date: Option<DateTime<Utc>>,
    pub days_until_shortage: DaysUntilShortage,
    pub recommended_order_qty: Decimal,
}

impl ReorderLine {
    pub fn from_material(material: &Material, now: DateTime<Utc>) -> Self {
        Self {
            material_id: material.id,
            material_code: material.material_code.clone(),
            name: material.name.clone(),
            unit: material.unit.clone(),
            supplier_id: material.supplier_id,
            warehouse_id: material.warehouse_id,
            status: material.status(),
            current_quantity: material.current_quantity,
            reorder_point: material.reorder_point,
            safety_stock: material.safety_stock,
            shortage_date: material.shortage_date(),
            days_until_shortage: material.days_until_shortage(now),
            recommended_order_qty: material.recommended_order_quantity(),
        }
    }
}

/// Select and annotate the materials to reorder
pub fn build_reorder_report<I>(materials: I, now: DateTime<Utc>) -> Vec<ReorderLine>
where
    I: IntoIterator<Item = Material>,
{
    select_for_reorder(materials)
        .iter()
        .map(|m| ReorderLine::from_material(m, now))
        .collect()
}
