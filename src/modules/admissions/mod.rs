//! Admission applications: public submission and staff review.
//!
//! An application moves `pending → under_review → approved | rejected`.
//! Approval comes in two modes: *simple* acknowledges the application and
//! asks the family to visit the school, *full* also provisions the student
//! and parent accounts through [`enrollment`](crate::modules::enrollment).

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::{init_admissions_router, init_applications_router};
