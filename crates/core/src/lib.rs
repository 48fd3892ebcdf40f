//! `medsupply-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, typed record identifiers and the validation rules applied
//! to inbound request structs before any record is constructed.

pub mod error;
pub mod id;
pub mod validate;

pub use error::{DomainError, DomainResult};
pub use id::{AssetId, DepartmentId, LotId, SupplierId, SupplyId};
