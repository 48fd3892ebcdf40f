//! Test doubles shared by service and seed tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use medsupply_assets::{NationalAsset, NewNationalAsset};
use medsupply_core::{AssetId, DepartmentId, LotId, SupplierId, SupplyId};
use medsupply_departments::{Department, NewDepartment};
use medsupply_observability::RecordingLogger;
use medsupply_supplies::{
    Lot, LotPatch, LotQueryPlan, NewSupplier, NewSupply, Supplier, Supply, UnsavedLot,
};

use crate::services::{AssetService, DepartmentService, LotService, SupplyService};
use crate::store::{
    AssetRepository, DepartmentRepository, InMemoryStore, LotRepository, StoreError, StoreResult,
    SupplierRepository, SupplyRepository,
};

/// In-memory store that records every call and fails the ones told to.
#[derive(Debug, Default)]
pub(crate) struct FaultyStore {
    inner: InMemoryStore,
    faults: Mutex<HashMap<&'static str, StoreError>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FaultyStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every later call to `operation` fail with `err`.
    pub(crate) fn fail(&self, operation: &'static str, err: StoreError) {
        self.faults.lock().unwrap().insert(operation, err);
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn called(&self, operation: &str) -> bool {
        self.calls().iter().any(|c| *c == operation)
    }

    fn enter(&self, operation: &'static str) -> StoreResult<()> {
        self.calls.lock().unwrap().push(operation);
        match self.faults.lock().unwrap().get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SupplyRepository for FaultyStore {
    async fn insert_supply(&self, supply: NewSupply) -> StoreResult<Supply> {
        self.enter("insert_supply")?;
        self.inner.insert_supply(supply).await
    }

    async fn find_supply(&self, id: SupplyId) -> StoreResult<Option<Supply>> {
        self.enter("find_supply")?;
        self.inner.find_supply(id).await
    }

    async fn list_supplies(&self, offset: u32, limit: u32) -> StoreResult<Vec<Supply>> {
        self.enter("list_supplies")?;
        self.inner.list_supplies(offset, limit).await
    }

    async fn save_supply(&self, supply: &Supply) -> StoreResult<()> {
        self.enter("save_supply")?;
        self.inner.save_supply(supply).await
    }

    async fn remove_supply(&self, id: SupplyId) -> StoreResult<()> {
        self.enter("remove_supply")?;
        self.inner.remove_supply(id).await
    }
}

#[async_trait]
impl SupplierRepository for FaultyStore {
    async fn insert_supplier(&self, supplier: NewSupplier) -> StoreResult<Supplier> {
        self.enter("insert_supplier")?;
        self.inner.insert_supplier(supplier).await
    }

    async fn find_supplier(&self, id: SupplierId) -> StoreResult<Option<Supplier>> {
        self.enter("find_supplier")?;
        self.inner.find_supplier(id).await
    }

    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        self.enter("list_suppliers")?;
        self.inner.list_suppliers().await
    }
}

#[async_trait]
impl LotRepository for FaultyStore {
    async fn insert_lot(&self, lot: UnsavedLot) -> StoreResult<Lot> {
        self.enter("insert_lot")?;
        self.inner.insert_lot(lot).await
    }

    async fn find_lot(&self, id: LotId) -> StoreResult<Option<Lot>> {
        self.enter("find_lot")?;
        self.inner.find_lot(id).await
    }

    async fn find_lots(&self, plan: &LotQueryPlan) -> StoreResult<Vec<Lot>> {
        self.enter("find_lots")?;
        self.inner.find_lots(plan).await
    }

    async fn preload_lot(&self, id: LotId, patch: &LotPatch) -> StoreResult<Option<Lot>> {
        self.enter("preload_lot")?;
        self.inner.preload_lot(id, patch).await
    }

    async fn save_lot(&self, lot: &Lot) -> StoreResult<()> {
        self.enter("save_lot")?;
        self.inner.save_lot(lot).await
    }

    async fn remove_lot(&self, id: LotId) -> StoreResult<()> {
        self.enter("remove_lot")?;
        self.inner.remove_lot(id).await
    }

    async fn delete_all_lots(&self) -> StoreResult<u64> {
        self.enter("delete_all_lots")?;
        self.inner.delete_all_lots().await
    }
}

#[async_trait]
impl DepartmentRepository for FaultyStore {
    async fn insert_department(&self, department: NewDepartment) -> StoreResult<Department> {
        self.enter("insert_department")?;
        self.inner.insert_department(department).await
    }

    async fn find_department(&self, id: DepartmentId) -> StoreResult<Option<Department>> {
        self.enter("find_department")?;
        self.inner.find_department(id).await
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        self.enter("list_departments")?;
        self.inner.list_departments().await
    }

    async fn remove_department(&self, id: DepartmentId) -> StoreResult<()> {
        self.enter("remove_department")?;
        self.inner.remove_department(id).await
    }

    async fn delete_all_departments(&self) -> StoreResult<u64> {
        self.enter("delete_all_departments")?;
        self.inner.delete_all_departments().await
    }
}

#[async_trait]
impl AssetRepository for FaultyStore {
    async fn insert_asset(&self, asset: NewNationalAsset) -> StoreResult<NationalAsset> {
        self.enter("insert_asset")?;
        self.inner.insert_asset(asset).await
    }

    async fn find_asset(&self, id: AssetId) -> StoreResult<Option<NationalAsset>> {
        self.enter("find_asset")?;
        self.inner.find_asset(id).await
    }

    async fn list_assets(&self) -> StoreResult<Vec<NationalAsset>> {
        self.enter("list_assets")?;
        self.inner.list_assets().await
    }

    async fn remove_asset(&self, id: AssetId) -> StoreResult<()> {
        self.enter("remove_asset")?;
        self.inner.remove_asset(id).await
    }

    async fn delete_all_assets(&self) -> StoreResult<u64> {
        self.enter("delete_all_assets")?;
        self.inner.delete_all_assets().await
    }
}

/// Every service wired against one [`FaultyStore`] and one [`RecordingLogger`].
pub(crate) struct Harness {
    pub store: Arc<FaultyStore>,
    pub logger: Arc<RecordingLogger>,
    pub supplies: Arc<SupplyService>,
    pub lots: Arc<LotService>,
    pub departments: Arc<DepartmentService>,
    pub assets: Arc<AssetService>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let store = FaultyStore::new();
        let logger = Arc::new(RecordingLogger::new());

        let supplies = Arc::new(SupplyService::new(store.clone(), logger.clone()));
        let lots = Arc::new(LotService::new(
            supplies.clone(),
            store.clone(),
            store.clone(),
            logger.clone(),
        ));
        let departments = Arc::new(DepartmentService::new(store.clone(), logger.clone()));
        let assets = Arc::new(AssetService::new(store.clone(), logger.clone()));

        Self {
            store,
            logger,
            supplies,
            lots,
            departments,
            assets,
        }
    }

    /// Insert a supply directly, bypassing the service.
    pub(crate) async fn supply(&self, name: &str, description: &str) -> Supply {
        self.store
            .insert_supply(NewSupply {
                name_material: name.to_string(),
                description: description.to_string(),
            })
            .await
            .unwrap()
    }

    pub(crate) async fn supplier(&self, name: &str) -> Supplier {
        self.store
            .insert_supplier(NewSupplier {
                name_supplier: name.to_string(),
                phone: None,
                address: None,
            })
            .await
            .unwrap()
    }
}
