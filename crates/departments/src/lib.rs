//! Hospital departments (seeded reference data).

pub mod department;

pub use department::{Department, NewDepartment};
