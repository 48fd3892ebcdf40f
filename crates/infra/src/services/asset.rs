use std::sync::Arc;

use medsupply_assets::{NationalAsset, NewNationalAsset};
use medsupply_core::validate::Validate;
use medsupply_core::AssetId;
use medsupply_observability::Logger;

use super::{ErrorClassifier, ServiceError, ServiceResult};
use crate::store::AssetRepository;

const SOURCE: &str = "NationalAssetService";

pub struct AssetService {
    assets: Arc<dyn AssetRepository>,
    logger: Arc<dyn Logger>,
    classify: ErrorClassifier,
}

impl AssetService {
    pub fn new(assets: Arc<dyn AssetRepository>, logger: Arc<dyn Logger>) -> Self {
        Self {
            assets,
            classify: ErrorClassifier::new(logger.clone(), SOURCE),
            logger,
        }
    }

    pub async fn create(&self, request: NewNationalAsset) -> ServiceResult<NationalAsset> {
        request.validate()?;
        let asset = self
            .assets
            .insert_asset(request)
            .await
            .map_err(|e| self.classify.store(e))?;
        self.logger.log(
            &format!("Created national asset with id {}", asset.id_national_assets),
            SOURCE,
        );
        Ok(asset)
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<NationalAsset>> {
        let assets = self.assets.list_assets().await?;
        self.logger
            .log(&format!("Found {} national assets", assets.len()), SOURCE);
        Ok(assets)
    }

    pub async fn find_one_by_id(&self, id: AssetId) -> ServiceResult<NationalAsset> {
        self.assets
            .find_asset(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("National asset with id {id} not found")))
    }

    pub async fn remove(&self, id: AssetId) -> ServiceResult<()> {
        let asset = self.find_one_by_id(id).await?;
        self.assets.remove_asset(asset.id_national_assets).await?;
        self.logger
            .log(&format!("Removed national asset with id {id}"), SOURCE);
        Ok(())
    }

    pub async fn delete_all_assets(&self) -> ServiceResult<u64> {
        self.assets
            .delete_all_assets()
            .await
            .map_err(|e| self.classify.store(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::INTERNAL_MESSAGE;
    use crate::store::StoreError;
    use crate::testing::Harness;
    use chrono::NaiveDate;

    fn monitor(serial: &str) -> NewNationalAsset {
        NewNationalAsset {
            name_asset: "Patient monitor".to_string(),
            serial_number: serial.to_string(),
            brand: Some("Philips".to_string()),
            model: None,
            acquisition_date: NaiveDate::from_ymd_opt(2023, 5, 2),
        }
    }

    #[tokio::test]
    async fn created_asset_round_trips() {
        let h = Harness::new();
        let created = h.assets.create(monitor("PM-001")).await.unwrap();
        let found = h.assets.find_one_by_id(created.id_national_assets).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn duplicate_serial_number_is_bad_request() {
        let h = Harness::new();
        h.assets.create(monitor("PM-001")).await.unwrap();
        let err = h.assets.create(monitor("PM-001")).await.unwrap_err();
        match err {
            ServiceError::BadRequest(detail) => assert!(detail.contains("PM-001")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_bulk_delete_is_internal() {
        let h = Harness::new();
        h.store
            .fail("delete_all_assets", StoreError::backend("disk full"));
        let err = h.assets.delete_all_assets().await.unwrap_err();
        assert_eq!(err, ServiceError::Internal(INTERNAL_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn remove_missing_asset_is_not_found() {
        let h = Harness::new();
        assert!(matches!(
            h.assets.remove(AssetId::new(1)).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(!h.store.called("remove_asset"));
    }
}
