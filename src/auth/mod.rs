// Authentication interface module
// Token verification and role gating for routes; credential issuance lives in a
// separate service and is out of scope here.

pub mod error;
pub mod middleware;
pub mod models;
pub mod token;

pub use error::AuthError;
pub use middleware::{AuthenticatedUser, RequireRole};
pub use models::Role;
pub use token::{Claims, TokenService};
