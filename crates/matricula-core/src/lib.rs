//! # Matricula Core
//!
//! Core types, errors, and utilities for the Matricula API.
//!
//! - [`errors`]: Application error type with HTTP response conversion and
//!   per-field validation details
//! - [`password`]: bcrypt password hashing behind the [`PasswordHasher`] seam
//! - [`serde`]: Deserialization helpers for loosely-typed form input
//!
//! # Example
//!
//! ```ignore
//! use matricula_core::errors::{AppError, FieldError};
//! use matricula_core::password::{hash_password, verify_password};
//!
//! let error = AppError::validation(vec![FieldError::new("parentInfo.email", "Valid parent email is required")]);
//!
//! let hash = hash_password("secure_password")?;
//! assert!(verify_password("secure_password", &hash)?);
//! ```

pub mod errors;
pub mod password;
pub mod serde;

pub use errors::{AppError, FieldError};
pub use password::{BcryptHasher, PasswordHasher, hash_password, verify_password};
