//! Seed orchestrator.
//!
//! Each `insert_new_*` step launches one create per record concurrently and
//! joins them. The join is fail-fast: the first failing create aborts the
//! family (the remaining in-flight creates are dropped) and the
//! `Inserted N ...` line is not logged. Records that finished before the
//! failure stay in the store.
//!
//! [`SeedService::delete_all`] clears departments, then assets, then lots,
//! one step after the other and without rollback: a failing step leaves the
//! earlier deletions in place and skips the later ones.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;

use medsupply_assets::NationalAsset;
use medsupply_core::{SupplierId, SupplyId};
use medsupply_departments::Department;
use medsupply_observability::Logger;
use medsupply_supplies::Lot;

use crate::services::{
    AssetService, DepartmentService, LotService, ServiceError, ServiceResult, SupplyService,
};

pub mod data;

pub use data::{SeedData, SeedLot};

const SOURCE: &str = "SeedService";

/// Counts reported by [`SeedService::execute_seed`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub departments_deleted: u64,
    pub assets_deleted: u64,
    pub lots_deleted: u64,
    pub supplies_created: usize,
    pub suppliers_created: usize,
    pub departments_inserted: usize,
    pub assets_inserted: usize,
    pub lots_inserted: usize,
}

/// Rows removed by [`SeedService::delete_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deleted {
    pub departments: u64,
    pub assets: u64,
    pub lots: u64,
}

pub struct SeedService {
    supplies: Arc<SupplyService>,
    lots: Arc<LotService>,
    departments: Arc<DepartmentService>,
    assets: Arc<AssetService>,
    logger: Arc<dyn Logger>,
    data: SeedData,
}

impl SeedService {
    pub fn new(
        supplies: Arc<SupplyService>,
        lots: Arc<LotService>,
        departments: Arc<DepartmentService>,
        assets: Arc<AssetService>,
        logger: Arc<dyn Logger>,
        data: SeedData,
    ) -> Self {
        Self {
            supplies,
            lots,
            departments,
            assets,
            logger,
            data,
        }
    }

    /// Wipe the seeded families, make sure the catalog exists, then insert
    /// departments, assets and lots.
    pub async fn execute_seed(&self) -> ServiceResult<SeedSummary> {
        let deleted = self.delete_all().await?;
        let (supplies_created, suppliers_created) = self.ensure_catalog().await?;

        let departments = self.insert_new_departments().await?;
        let assets = self.insert_new_assets().await?;
        let lots = self.insert_new_lots().await?;

        self.logger.log("Seed executed", SOURCE);
        Ok(SeedSummary {
            departments_deleted: deleted.departments,
            assets_deleted: deleted.assets,
            lots_deleted: deleted.lots,
            supplies_created,
            suppliers_created,
            departments_inserted: departments.len(),
            assets_inserted: assets.len(),
            lots_inserted: lots.len(),
        })
    }

    pub async fn insert_new_assets(&self) -> ServiceResult<Vec<NationalAsset>> {
        let inserted = try_join_all(
            self.data
                .assets
                .iter()
                .cloned()
                .map(|asset| self.assets.create(asset)),
        )
        .await?;
        self.logger
            .log(&format!("Inserted {} assets", self.data.assets.len()), SOURCE);
        Ok(inserted)
    }

    pub async fn insert_new_departments(&self) -> ServiceResult<Vec<Department>> {
        let inserted = try_join_all(
            self.data
                .departments
                .iter()
                .cloned()
                .map(|department| self.departments.create(department)),
        )
        .await?;
        self.logger.log(
            &format!("Inserted {} departments", self.data.departments.len()),
            SOURCE,
        );
        Ok(inserted)
    }

    /// Lots name their supply and supplier; both are resolved against the
    /// current catalog before any create is launched. A name missing from
    /// the catalog fails with `NotFound`. A lot without a supplier name gets
    /// the default supplier.
    pub async fn insert_new_lots(&self) -> ServiceResult<Vec<Lot>> {
        let supply_ids: HashMap<String, SupplyId> = self
            .supplies
            .find_all(0, u32::MAX)
            .await?
            .into_iter()
            .map(|s| (s.name_material, s.id_medical_supplies))
            .collect();
        let supplier_ids: HashMap<String, SupplierId> = self
            .lots
            .find_all_suppliers()
            .await?
            .into_iter()
            .map(|s| (s.name_supplier, s.id_suppliers))
            .collect();

        let mut resolved = Vec::with_capacity(self.data.lots.len());
        for seed in &self.data.lots {
            let supply_id = supply_ids.get(&seed.name_material).copied().ok_or_else(|| {
                ServiceError::not_found(format!(
                    "Medical supply {:?} is not in the catalog",
                    seed.name_material
                ))
            })?;
            let supplier_id = match &seed.name_supplier {
                Some(name) => Some(supplier_ids.get(name).copied().ok_or_else(|| {
                    ServiceError::not_found(format!("Supplier {name:?} is not in the catalog"))
                })?),
                None => None,
            };
            resolved.push((seed.details.clone(), supply_id, supplier_id));
        }

        let inserted = try_join_all(
            resolved
                .into_iter()
                .map(|(details, supply_id, supplier_id)| {
                    self.lots.create(details, supply_id, supplier_id)
                }),
        )
        .await?;
        self.logger
            .log(&format!("Inserted {} lots", self.data.lots.len()), SOURCE);
        Ok(inserted)
    }

    /// Delete departments, then assets, then lots.
    pub async fn delete_all(&self) -> ServiceResult<Deleted> {
        let departments = self.departments.delete_all_departments().await?;
        let assets = self.assets.delete_all_assets().await?;
        let lots = self.lots.delete_all_lots().await?;
        Ok(Deleted {
            departments,
            assets,
            lots,
        })
    }

    /// Insert catalog supplies and suppliers that are missing by name, in
    /// dataset order. Returns how many of each were created.
    async fn ensure_catalog(&self) -> ServiceResult<(usize, usize)> {
        let existing: Vec<String> = self
            .supplies
            .find_all(0, u32::MAX)
            .await?
            .into_iter()
            .map(|s| s.name_material)
            .collect();
        let mut supplies_created = 0;
        for supply in &self.data.supplies {
            if !existing.contains(&supply.name_material) {
                self.supplies.create(supply.clone()).await?;
                supplies_created += 1;
            }
        }

        let existing: Vec<String> = self
            .lots
            .find_all_suppliers()
            .await?
            .into_iter()
            .map(|s| s.name_supplier)
            .collect();
        let mut suppliers_created = 0;
        for supplier in &self.data.suppliers {
            if !existing.contains(&supplier.name_supplier) {
                self.lots.create_supplier(supplier.clone()).await?;
                suppliers_created += 1;
            }
        }

        Ok((supplies_created, suppliers_created))
    }
}
