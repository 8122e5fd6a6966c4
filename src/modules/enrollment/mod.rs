//! Account provisioning shared by full approval and admin quick-add.
//!
//! A provisioning run creates the Student, finds or creates the Parent by
//! contact email, records the child on the parent and links the student back,
//! all inside the caller's [`StoreTx`](matricula_db::StoreTx).

pub mod model;
pub mod service;
