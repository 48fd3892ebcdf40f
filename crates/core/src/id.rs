//! Strongly-typed identifiers used across the domain.
//!
//! Records are keyed by store-generated serial integers. Each table gets its
//! own newtype so a supplier id can never be passed where a supply id is
//! expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a medical supply (`id_medical_supplies`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplyId(i32);

/// Identifier of a supplier (`id_suppliers`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierId(i32);

/// Identifier of a lot (`id_lots`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotId(i32);

/// Identifier of a department (`id_departments`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(i32);

/// Identifier of a national asset (`id_national_assets`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(i32);

macro_rules! impl_serial_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a raw serial value.
            ///
            /// No positivity check: values read back from the store are trusted.
            /// Use `parse_positive` for caller-supplied ids.
            pub const fn new(value: i32) -> Self {
                Self(value)
            }

            /// Validate a caller-supplied id (must be strictly positive).
            pub fn parse_positive(value: i64) -> Result<Self, DomainError> {
                if value <= 0 {
                    return Err(DomainError::invalid_id(format!(
                        "{} must be a positive integer, got {}",
                        $name, value
                    )));
                }
                i32::try_from(value).map(Self).map_err(|_| {
                    DomainError::invalid_id(format!("{} out of range: {}", $name, value))
                })
            }

            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$t> for i32 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Self::parse_positive(raw)
            }
        }
    };
}

impl_serial_newtype!(SupplyId, "id_medical_supplies");
impl_serial_newtype!(SupplierId, "id_suppliers");
impl_serial_newtype!(LotId, "id_lots");
impl_serial_newtype!(DepartmentId, "id_departments");
impl_serial_newtype!(AssetId, "id_national_assets");

impl Default for SupplierId {
    /// Supplier attached to a lot when the caller names none.
    fn default() -> Self {
        Self(1)
    }
}
