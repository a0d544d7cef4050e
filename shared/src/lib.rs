//! Shared types and core stock logic for the Materials Inventory Platform
//!
//! This crate contains the domain models and the pure stock computations
//! shared between the backend, the dashboard (via WASM), and tests:
//! status derivation, shortage projection, the adjustment ledger, and
//! reorder selection.

pub mod ledger;
pub mod models;
pub mod reorder;
pub mod stock_status;
pub mod types;
pub mod validation;

pub use ledger::*;
pub use models::*;
pub use reorder::*;
pub use stock_status::*;
pub use types::*;
pub use validation::*;
