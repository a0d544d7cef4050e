//! Business logic services for the Materials Inventory Platform

pub mod auth;
pub mod material;
pub mod reporting;
pub mod stock;
pub mod supplier;
pub mod user;
pub mod warehouse;

pub use auth::AuthService;
pub use material::MaterialService;
pub use reporting::ReportingService;
pub use stock::StockService;
pub use supplier::SupplierService;
pub use user::UserService;
pub use warehouse::WarehouseService;
