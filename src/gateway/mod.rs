//! Gateway server implementation

pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
mod server;

pub use auth::{AuthenticatedUser, auth_middleware, authenticate};
pub use error::ApiError;
pub use router::{AppState, create_router};
pub use server::Gateway;
