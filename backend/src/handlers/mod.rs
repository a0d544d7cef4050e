//! HTTP request handlers

pub mod auth;
pub mod health;
pub mod material;
pub mod reporting;
pub mod stock;
pub mod supplier;
pub mod user;
pub mod warehouse;

pub use auth::*;
pub use health::*;
pub use material::*;
pub use reporting::*;
pub use stock::*;
pub use supplier::*;
pub use user::*;
pub use warehouse::*;
