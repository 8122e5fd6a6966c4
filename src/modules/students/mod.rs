//! Staff administration of enrolled students: direct enrollment, record
//! upkeep and orphan reconciliation. Students themselves get a profile
//! route for their own contact details.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::{init_student_profile_router, init_students_router};
