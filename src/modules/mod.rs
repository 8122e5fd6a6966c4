pub mod admissions;
pub mod auth;
pub mod dashboard;
pub mod enrollment;
pub mod parents;
pub mod students;
