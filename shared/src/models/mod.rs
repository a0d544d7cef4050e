//! Domain models for the Materials Inventory Platform

mod material;
mod stock_history;
mod user;

pub use material::*;
pub use stock_history::*;
pub use user::*;
