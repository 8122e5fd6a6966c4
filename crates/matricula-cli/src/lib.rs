//! # Matricula CLI
//!
//! Administrative helpers behind the `matricula-cli` binary: staff account
//! bootstrap and fake admission data for development.
//!
//! ```ignore
//! use matricula_cli::seeder::{generate_applications, seed_applications};
//!
//! let applications = generate_applications(50, "India");
//! seed_applications(&store, &applications, Utc::now()).await?;
//! ```

pub mod seeder;
