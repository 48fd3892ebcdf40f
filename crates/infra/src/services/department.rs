use std::sync::Arc;

use medsupply_core::validate::Validate;
use medsupply_core::DepartmentId;
use medsupply_departments::{Department, NewDepartment};
use medsupply_observability::Logger;

use super::{ErrorClassifier, ServiceError, ServiceResult};
use crate::store::DepartmentRepository;

const SOURCE: &str = "DepartmentService";

pub struct DepartmentService {
    departments: Arc<dyn DepartmentRepository>,
    logger: Arc<dyn Logger>,
    classify: ErrorClassifier,
}

impl DepartmentService {
    pub fn new(departments: Arc<dyn DepartmentRepository>, logger: Arc<dyn Logger>) -> Self {
        Self {
            departments,
            classify: ErrorClassifier::new(logger.clone(), SOURCE),
            logger,
        }
    }

    pub async fn create(&self, request: NewDepartment) -> ServiceResult<Department> {
        request.validate()?;
        let department = self
            .departments
            .insert_department(request)
            .await
            .map_err(|e| self.classify.store(e))?;
        self.logger.log(
            &format!("Created department with id {}", department.id_departments),
            SOURCE,
        );
        Ok(department)
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<Department>> {
        let departments = self.departments.list_departments().await?;
        self.logger
            .log(&format!("Found {} departments", departments.len()), SOURCE);
        Ok(departments)
    }

    pub async fn find_one_by_id(&self, id: DepartmentId) -> ServiceResult<Department> {
        self.departments
            .find_department(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Department with id {id} not found")))
    }

    pub async fn remove(&self, id: DepartmentId) -> ServiceResult<()> {
        let department = self.find_one_by_id(id).await?;
        self.departments
            .remove_department(department.id_departments)
            .await?;
        self.logger
            .log(&format!("Removed department with id {id}"), SOURCE);
        Ok(())
    }

    pub async fn delete_all_departments(&self) -> ServiceResult<u64> {
        self.departments
            .delete_all_departments()
            .await
            .map_err(|e| self.classify.store(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    fn emergency() -> NewDepartment {
        NewDepartment {
            name_department: "Emergency".to_string(),
            description: Some("24h triage".to_string()),
        }
    }

    #[tokio::test]
    async fn created_department_round_trips() {
        let h = Harness::new();
        let created = h.departments.create(emergency()).await.unwrap();
        let found = h
            .departments
            .find_one_by_id(created.id_departments)
            .await
            .unwrap();
        assert_eq!(found, created);
        assert_eq!(h.departments.find_all().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn duplicate_name_is_bad_request() {
        let h = Harness::new();
        h.departments.create(emergency()).await.unwrap();
        let err = h.departments.create(emergency()).await.unwrap_err();
        match err {
            ServiceError::BadRequest(detail) => assert!(detail.contains("name_department")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn remove_then_find_is_not_found() {
        let h = Harness::new();
        let created = h.departments.create(emergency()).await.unwrap();
        h.departments.remove(created.id_departments).await.unwrap();
        assert!(matches!(
            h.departments.find_one_by_id(created.id_departments).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_all_departments_returns_count() {
        let h = Harness::new();
        h.departments.create(emergency()).await.unwrap();
        h.departments
            .create(NewDepartment {
                name_department: "Radiology".to_string(),
                description: None,
            })
            .await
            .unwrap();

        assert_eq!(h.departments.delete_all_departments().await.unwrap(), 2);
        assert!(h.departments.find_all().await.unwrap().is_empty());
    }
}
