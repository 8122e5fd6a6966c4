//! # Matricula Auth
//!
//! - [`role`]: the four identity kinds that can sign in
//! - [`claims`]: access token claim structure
//! - [`jwt`]: HS256 token creation and verification
//!
//! # Example
//!
//! ```ignore
//! use matricula_auth::{Role, create_access_token, verify_token};
//! use matricula_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "101@nalandaschool.edu", Role::Student, &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.role, Role::Student);
//! ```

pub mod claims;
pub mod jwt;
pub mod role;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
pub use role::Role;
