//! Seeding and account bootstrap helpers used by the CLI binary.

pub mod applications;
pub mod staff;

pub use applications::{generate_applications, seed_applications};
pub use staff::{StaffSeed, create_staff};
