//! Sign-in for every role and resolution of the signed-in identity.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_auth_router;
