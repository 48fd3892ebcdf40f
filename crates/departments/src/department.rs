use serde::{Deserialize, Serialize};

use medsupply_core::validate::{self, Validate};
use medsupply_core::{DepartmentId, DomainResult};

/// A hospital department. `name_department` is unique in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id_departments: DepartmentId,
    pub name_department: String,
    pub description: Option<String>,
}

/// Request: create a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDepartment {
    pub name_department: String,
    pub description: Option<String>,
}

impl NewDepartment {
    pub fn into_department(self, id: DepartmentId) -> Department {
        Department {
            id_departments: id,
            name_department: self.name_department,
            description: self.description,
        }
    }
}

impl Validate for NewDepartment {
    fn validate(&self) -> DomainResult<()> {
        validate::required_text("name_department", &self.name_department)?;
        validate::optional_text("description", self.description.as_deref())
    }
}
