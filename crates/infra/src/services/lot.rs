//! Lot lifecycle: create, query, patch, remove.
//!
//! A lot always carries its medical supply: the supply lookup is fail-fast
//! (`NotFound`). The supplier lookup is best-effort: an unknown supplier id
//! leaves `supplier` as `None` instead of failing.

use std::sync::Arc;

use medsupply_core::validate::Validate;
use medsupply_core::{LotId, SupplierId, SupplyId};
use medsupply_observability::Logger;
use medsupply_supplies::{
    Lot, LotPatch, LotQueryPlan, NewLot, NewSupplier, PaginationRequest, Supplier,
};

use super::{ErrorClassifier, ServiceError, ServiceResult, SupplyService};
use crate::store::{LotRepository, SupplierRepository};

const SOURCE: &str = "LotService";

pub struct LotService {
    supplies: Arc<SupplyService>,
    lots: Arc<dyn LotRepository>,
    suppliers: Arc<dyn SupplierRepository>,
    logger: Arc<dyn Logger>,
    classify: ErrorClassifier,
}

impl LotService {
    pub fn new(
        supplies: Arc<SupplyService>,
        lots: Arc<dyn LotRepository>,
        suppliers: Arc<dyn SupplierRepository>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            supplies,
            lots,
            suppliers,
            classify: ErrorClassifier::new(logger.clone(), SOURCE),
            logger,
        }
    }

    /// Create a lot for `supply_id`. `supplier_id` defaults to supplier 1.
    pub async fn create(
        &self,
        details: NewLot,
        supply_id: SupplyId,
        supplier_id: Option<SupplierId>,
    ) -> ServiceResult<Lot> {
        details.validate()?;
        let supplier_id = supplier_id.unwrap_or_default();

        let supply = self
            .supplies
            .find_one_by_id(supply_id)
            .await
            .map_err(|e| self.classify.service(e))?;
        let supplier = self
            .suppliers
            .find_supplier(supplier_id)
            .await
            .map_err(|e| self.classify.store(e))?;

        let lot = self
            .lots
            .insert_lot(details.attach(supply, supplier))
            .await
            .map_err(|e| self.classify.store(e))?;
        self.logger
            .log(&format!("Created Lot with id {}", lot.id_lots), SOURCE);
        Ok(lot)
    }

    /// List lots, or search them when the request carries a non-empty term.
    pub async fn find(&self, request: &PaginationRequest) -> ServiceResult<Vec<Lot>> {
        request.validate()?;
        let plan = LotQueryPlan::from_request(request);
        let lots = self.lots.find_lots(&plan).await?;
        self.logger.log(&format!("Found {} lots", lots.len()), SOURCE);
        Ok(lots)
    }

    /// Fails with `BadRequest` when no lot has this id.
    pub async fn find_one_by_id(&self, id: LotId) -> ServiceResult<Lot> {
        self.lots
            .find_lot(id)
            .await?
            .ok_or_else(|| ServiceError::bad_request(format!("Lot with id {id} not found")))
    }

    /// Merge `patch` onto the stored lot, optionally repointing its relations.
    ///
    /// Fails with `NotFound` (and writes nothing) when the lot does not exist.
    /// Failures while re-resolving relations propagate unclassified; only the
    /// final save is classified.
    pub async fn update(
        &self,
        id: LotId,
        patch: LotPatch,
        supply_id: Option<SupplyId>,
        supplier_id: Option<SupplierId>,
    ) -> ServiceResult<Lot> {
        patch.validate()?;
        let mut lot = self
            .lots
            .preload_lot(id, &patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("Lot not found"))?;

        if let Some(supply_id) = supply_id {
            lot.medical_supply = self.supplies.find_one_by_id(supply_id).await?;
        }
        if let Some(supplier_id) = supplier_id {
            lot.supplier = self.suppliers.find_supplier(supplier_id).await?;
        }

        self.lots
            .save_lot(&lot)
            .await
            .map_err(|e| self.classify.store(e))?;
        self.logger
            .log(&format!("Updated lot with id {id}"), SOURCE);
        Ok(lot)
    }

    pub async fn remove(&self, id: LotId) -> ServiceResult<()> {
        let lot = self.find_one_by_id(id).await?;
        self.lots.remove_lot(lot.id_lots).await?;
        self.logger
            .log(&format!("Removed Lot with id {id}"), SOURCE);
        Ok(())
    }

    /// Delete every lot; returns the number removed.
    pub async fn delete_all_lots(&self) -> ServiceResult<u64> {
        self.lots
            .delete_all_lots()
            .await
            .map_err(|e| self.classify.store(e))
    }

    pub async fn find_all_suppliers(&self) -> ServiceResult<Vec<Supplier>> {
        let suppliers = self.suppliers.list_suppliers().await?;
        self.logger
            .log(&format!("Found {} suppliers", suppliers.len()), SOURCE);
        Ok(suppliers)
    }

    pub async fn create_supplier(&self, request: NewSupplier) -> ServiceResult<Supplier> {
        request.validate()?;
        let supplier = self
            .suppliers
            .insert_supplier(request)
            .await
            .map_err(|e| self.classify.store(e))?;
        self.logger.log(
            &format!("Created supplier with id {}", supplier.id_suppliers),
            SOURCE,
        );
        Ok(supplier)
    }
}
