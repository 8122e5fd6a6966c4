//! School-wide head counts for administrators.

pub mod controller;
pub mod router;
pub mod service;

pub use router::init_dashboard_router;
