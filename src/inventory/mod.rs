// Inventory module
// Batch-partitioned stock ledger, append-only movement log, stock status view,
// and the purchase-receipt and manual adjustment paths.

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use service::*;
