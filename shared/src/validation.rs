//! Validation utilities for the Materials Inventory Platform

use rust_decimal::Decimal;

use crate::models::NewMaterial;

// ============================================================================
// Material Validations
// ============================================================================

/// Validate material code format (1-32 chars of letters, digits, '-' or '_')
pub fn validate_material_code(code: &str) -> Result<(), &'static str> {
    if code.is_empty() {
        return Err("Material code cannot be empty");
    }
    if code.len() > 32 {
        return Err("Material code must be at most 32 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Material code may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

/// Largest quantity, threshold or daily usage a material may carry
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Longest supplier lead time accepted, in days
pub const MAX_LEAD_TIME_DAYS: i32 = 3650;

/// Validate a stock quantity or threshold is within `0..=MAX_QUANTITY`
pub fn validate_non_negative(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("Value cannot be negative");
    }
    if value > MAX_QUANTITY {
        return Err("Value cannot exceed 1000000000000");
    }
    Ok(())
}

/// Validate supplier lead time is between one day and ten years
pub fn validate_lead_time(days: i32) -> Result<(), &'static str> {
    if days <= 0 {
        return Err("Lead time must be at least 1 day");
    }
    if days > MAX_LEAD_TIME_DAYS {
        return Err("Lead time must be at most 3650 days");
    }
    Ok(())
}

/// Validate a required display name
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty");
    }
    if name.chars().count() > 200 {
        return Err("Name must be at most 200 characters");
    }
    Ok(())
}

/// Validate all fields of a new material, returning the offending field
pub fn validate_new_material(input: &NewMaterial) -> Result<(), (&'static str, &'static str)> {
    validate_material_code(&input.material_code).map_err(|e| ("material_code", e))?;
    validate_name(&input.name).map_err(|e| ("name", e))?;
    if input.unit.trim().is_empty() {
        return Err(("unit", "Unit cannot be empty"));
    }
    validate_non_negative(input.current_quantity).map_err(|e| ("current_quantity", e))?;
    validate_non_negative(input.reorder_point).map_err(|e| ("reorder_point", e))?;
    validate_non_negative(input.safety_stock).map_err(|e| ("safety_stock", e))?;
    validate_non_negative(input.avg_daily_usage).map_err(|e| ("avg_daily_usage", e))?;
    validate_lead_time(input.lead_time_days).map_err(|e| ("lead_time_days", e))?;
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> NewMaterial {
        NewMaterial {
            material_code: "CU-WIRE_2".to_string(),
            name: "Copper wire".to_string(),
            supplier_id: None,
            warehouse_id: None,
            unit: "m".to_string(),
            current_quantity: Decimal::from(10),
            reorder_point: Decimal::from(5),
            safety_stock: Decimal::from(2),
            avg_daily_usage: Decimal::ZERO,
            lead_time_days: 3,
        }
    }

    #[test]
    fn test_validate_material_code() {
        assert!(validate_material_code("STL-001").is_ok());
        assert!(validate_material_code("abc_9").is_ok());
        assert!(validate_material_code("").is_err());
        assert!(validate_material_code("STL 001").is_err());
        assert!(validate_material_code(&"X".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_lead_time() {
        assert!(validate_lead_time(1).is_ok());
        assert!(validate_lead_time(0).is_err());
        assert!(validate_lead_time(-3).is_err());
        assert!(validate_lead_time(MAX_LEAD_TIME_DAYS).is_ok());
        assert!(validate_lead_time(MAX_LEAD_TIME_DAYS + 1).is_err());
    }

    #[test]
    fn test_validate_non_negative_bounds() {
        assert_eq!(MAX_QUANTITY, Decimal::from(1_000_000_000_000_i64));
        assert!(validate_non_negative(Decimal::ZERO).is_ok());
        assert!(validate_non_negative(MAX_QUANTITY).is_ok());
        assert!(validate_non_negative(MAX_QUANTITY + Decimal::new(1, 2)).is_err());
        assert!(validate_non_negative(Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_validate_new_material() {
        assert!(validate_new_material(&valid_input()).is_ok());

        let mut input = valid_input();
        input.safety_stock = Decimal::from(-1);
        assert_eq!(validate_new_material(&input).unwrap_err().0, "safety_stock");

        let mut input = valid_input();
        input.avg_daily_usage = "10000000000000000000000000000".parse().unwrap();
        assert_eq!(validate_new_material(&input).unwrap_err().0, "avg_daily_usage");

        let mut input = valid_input();
        input.lead_time_days = 0;
        assert_eq!(validate_new_material(&input).unwrap_err().0, "lead_time_days");

        let mut input = valid_input();
        input.name = "   ".to_string();
        assert_eq!(validate_new_material(&input).unwrap_err().0, "name");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("buyer@plant.com").is_ok());
        assert!(validate_email("nope").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }
}
