// Sales module
// The checkout core: FIFO-by-expiry allocation planning, pricing arithmetic,
// and the atomic sale transaction coordinator.

pub mod allocation;
pub mod error;
pub mod handlers;
pub mod invoice;
pub mod models;
pub mod pricing;
pub mod repository;
pub mod service;

pub use allocation::*;
pub use error::*;
pub use handlers::*;
pub use invoice::*;
pub use models::*;
pub use pricing::*;
pub use repository::*;
pub use service::*;
