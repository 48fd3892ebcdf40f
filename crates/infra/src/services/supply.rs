use std::sync::Arc;

use medsupply_core::validate::Validate;
use medsupply_core::SupplyId;
use medsupply_observability::Logger;
use medsupply_supplies::{NewSupply, Supply, SupplyPatch};

use super::{ErrorClassifier, ServiceError, ServiceResult};
use crate::store::{StoreError, SupplyRepository};

const SOURCE: &str = "MedicalSupplyService";

/// Medical-supply catalog. Also the supply lookup used by [`super::LotService`].
pub struct SupplyService {
    supplies: Arc<dyn SupplyRepository>,
    logger: Arc<dyn Logger>,
    classify: ErrorClassifier,
}

impl SupplyService {
    pub fn new(supplies: Arc<dyn SupplyRepository>, logger: Arc<dyn Logger>) -> Self {
        Self {
            supplies,
            classify: ErrorClassifier::new(logger.clone(), SOURCE),
            logger,
        }
    }

    pub async fn create(&self, request: NewSupply) -> ServiceResult<Supply> {
        request.validate()?;
        let supply = self
            .supplies
            .insert_supply(request)
            .await
            .map_err(|e| self.classify.store(e))?;
        self.logger.log(
            &format!("Created medical supply with id {}", supply.id_medical_supplies),
            SOURCE,
        );
        Ok(supply)
    }

    /// Supplies ordered by id.
    pub async fn find_all(&self, offset: u32, limit: u32) -> ServiceResult<Vec<Supply>> {
        let supplies = self.supplies.list_supplies(offset, limit).await?;
        self.logger
            .log(&format!("Found {} medical supplies", supplies.len()), SOURCE);
        Ok(supplies)
    }

    /// Fails with `NotFound` when no supply has this id.
    pub async fn find_one_by_id(&self, id: SupplyId) -> ServiceResult<Supply> {
        self.supplies
            .find_supply(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Medical supply with id {id} not found")))
    }

    pub async fn update(&self, id: SupplyId, patch: SupplyPatch) -> ServiceResult<Supply> {
        patch.validate()?;
        let mut supply = self.find_one_by_id(id).await?;
        patch.apply(&mut supply);
        self.supplies
            .save_supply(&supply)
            .await
            .map_err(|e| self.classify.store(e))?;
        self.logger
            .log(&format!("Updated medical supply with id {id}"), SOURCE);
        Ok(supply)
    }

    /// Fails with `BadRequest` while lots still reference the supply.
    pub async fn remove(&self, id: SupplyId) -> ServiceResult<()> {
        let supply = self.find_one_by_id(id).await?;
        match self.supplies.remove_supply(supply.id_medical_supplies).await {
            Ok(()) => {}
            Err(StoreError::ForeignKeyViolation(_)) => {
                return Err(ServiceError::bad_request(format!(
                    "Medical supply with id {id} is still referenced by lots"
                )));
            }
            Err(e) => return Err(e.into()),
        }
        self.logger
            .log(&format!("Removed medical supply with id {id}"), SOURCE);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use chrono::NaiveDate;
    use medsupply_supplies::NewLot;

    fn gauze() -> NewSupply {
        NewSupply {
            name_material: "Gauze".to_string(),
            description: "Sterile gauze pads".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_with_store_detail() {
        let h = Harness::new();
        h.supplies.create(gauze()).await.unwrap();

        let err = h.supplies.create(gauze()).await.unwrap_err();
        match err {
            ServiceError::BadRequest(detail) => assert!(detail.contains("Gauze")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_name_fails_validation_before_any_write() {
        let h = Harness::new();
        let err = h
            .supplies
            .create(NewSupply {
                name_material: "  ".to_string(),
                description: "x".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::BadRequest(_)));
        assert!(!h.store.called("insert_supply"));
    }

    #[tokio::test]
    async fn find_one_by_id_reports_missing_supply_as_not_found() {
        let h = Harness::new();
        let err = h.supplies.find_one_by_id(SupplyId::new(42)).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::not_found("Medical supply with id 42 not found")
        );
    }

    #[tokio::test]
    async fn update_merges_patch_and_persists() {
        let h = Harness::new();
        let created = h.supplies.create(gauze()).await.unwrap();

        let updated = h
            .supplies
            .update(
                created.id_medical_supplies,
                SupplyPatch {
                    description: Some("Non-sterile gauze".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name_material, "Gauze");
        assert_eq!(updated.description, "Non-sterile gauze");
        let stored = h.supplies.find_one_by_id(created.id_medical_supplies).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn remove_refuses_supply_referenced_by_lots() {
        let h = Harness::new();
        let supply = h.supplies.create(gauze()).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        h.lots
            .create(
                NewLot {
                    stock: 5,
                    date_delivery: day,
                    due_date: day,
                },
                supply.id_medical_supplies,
                None,
            )
            .await
            .unwrap();

        let err = h.supplies.remove(supply.id_medical_supplies).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn find_all_pages_by_id() {
        let h = Harness::new();
        for name in ["Gauze", "Syringe", "Swab"] {
            h.supply(name, "x").await;
        }

        let page = h.supplies.find_all(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name_material, "Syringe");
    }
}
