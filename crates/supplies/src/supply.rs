use serde::{Deserialize, Serialize};

use medsupply_core::validate::{self, Validate};
use medsupply_core::{DomainResult, SupplyId};

/// Catalog entry describing a type of medical material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supply {
    pub id_medical_supplies: SupplyId,
    pub name_material: String,
    pub description: String,
}

/// Request: create a supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupply {
    pub name_material: String,
    pub description: String,
}

impl NewSupply {
    pub fn into_supply(self, id: SupplyId) -> Supply {
        Supply {
            id_medical_supplies: id,
            name_material: self.name_material,
            description: self.description,
        }
    }
}

impl Validate for NewSupply {
    fn validate(&self) -> DomainResult<()> {
        validate::required_text("name_material", &self.name_material)?;
        validate::required_text("description", &self.description)
    }
}

/// Request: partial update of a supply. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyPatch {
    pub name_material: Option<String>,
    pub description: Option<String>,
}

impl SupplyPatch {
    pub fn apply(&self, supply: &mut Supply) {
        if let Some(name) = &self.name_material {
            supply.name_material = name.clone();
        }
        if let Some(description) = &self.description {
            supply.description = description.clone();
        }
    }
}

impl Validate for SupplyPatch {
    fn validate(&self) -> DomainResult<()> {
        validate::optional_text("name_material", self.name_material.as_deref())?;
        validate::optional_text("description", self.description.as_deref())
    }
}
