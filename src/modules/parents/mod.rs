//! Parent portal: the signed-in parent's children and their attendance and
//! marks. A parent only ever sees students on their own child list.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_parents_router;
