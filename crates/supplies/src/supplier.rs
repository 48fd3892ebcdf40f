use serde::{Deserialize, Serialize};

use medsupply_core::validate::{self, Validate};
use medsupply_core::{DomainResult, SupplierId};

/// Vendor associated with one or more lots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id_suppliers: SupplierId,
    pub name_supplier: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Request: register a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name_supplier: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl NewSupplier {
    pub fn into_supplier(self, id: SupplierId) -> Supplier {
        Supplier {
            id_suppliers: id,
            name_supplier: self.name_supplier,
            phone: self.phone,
            address: self.address,
        }
    }
}

impl Validate for NewSupplier {
    fn validate(&self) -> DomainResult<()> {
        validate::required_text("name_supplier", &self.name_supplier)?;
        validate::optional_text("phone", self.phone.as_deref())?;
        validate::optional_text("address", self.address.as_deref())
    }
}
