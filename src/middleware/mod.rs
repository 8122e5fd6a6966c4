//! Middleware and extractors for cross-cutting request concerns.
//!
//! - [`auth`]: bearer token extractor
//! - [`role`]: role gates applied to whole routers
//! - [`rate_limit`]: per-client login throttling
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. `AuthUser` extractor validates the JWT and extracts claims
//! 3. Role middleware rejects principals outside the allowed roles
//! 4. Handler executes if all checks pass
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware, routing::get};
//! use crate::middleware::role::require_staff;
//!
//! let staff_routes = Router::new()
//!     .route("/applications", get(list_applications))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_staff));
//! ```

pub mod auth;
pub mod rate_limit;
pub mod role;
