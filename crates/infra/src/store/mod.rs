//! Persistence boundary.
//!
//! One repository trait per record family. Services hold them as
//! `Arc<dyn ...Repository>` so the same service code runs against the
//! in-memory store (tests/dev) and Postgres (production).
//!
//! Stores enforce uniqueness and referential constraints themselves; services
//! never pre-check them and instead classify the resulting [`StoreError`].

use async_trait::async_trait;
use thiserror::Error;

use medsupply_assets::{NationalAsset, NewNationalAsset};
use medsupply_core::{AssetId, DepartmentId, LotId, SupplierId, SupplyId};
use medsupply_departments::{Department, NewDepartment};
use medsupply_supplies::{
    Lot, LotPatch, LotQueryPlan, NewSupplier, NewSupply, Supplier, Supply, UnsavedLot,
};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write. `detail` is the store's
    /// own description of the conflicting key.
    #[error("duplicate key value violates unique constraint: {detail}")]
    UniqueViolation { detail: String },

    /// A foreign-key constraint rejected the write or delete.
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Connection, decoding or any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn unique(detail: impl Into<String>) -> Self {
        Self::UniqueViolation {
            detail: detail.into(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

#[async_trait]
pub trait SupplyRepository: Send + Sync {
    async fn insert_supply(&self, supply: NewSupply) -> StoreResult<Supply>;
    async fn find_supply(&self, id: SupplyId) -> StoreResult<Option<Supply>>;
    /// Supplies ordered by id.
    async fn list_supplies(&self, offset: u32, limit: u32) -> StoreResult<Vec<Supply>>;
    async fn save_supply(&self, supply: &Supply) -> StoreResult<()>;
    async fn remove_supply(&self, id: SupplyId) -> StoreResult<()>;
}

#[async_trait]
pub trait SupplierRepository: Send + Sync {
    async fn insert_supplier(&self, supplier: NewSupplier) -> StoreResult<Supplier>;
    async fn find_supplier(&self, id: SupplierId) -> StoreResult<Option<Supplier>>;
    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>>;
}

#[async_trait]
pub trait LotRepository: Send + Sync {
    /// Persist a new lot; the store assigns `id_lots`.
    async fn insert_lot(&self, lot: UnsavedLot) -> StoreResult<Lot>;

    /// Fetch one lot hydrated with its supply and supplier.
    async fn find_lot(&self, id: LotId) -> StoreResult<Option<Lot>>;

    /// Run a resolved listing plan.
    async fn find_lots(&self, plan: &LotQueryPlan) -> StoreResult<Vec<Lot>>;

    /// Load the stored lot and merge `patch` onto it without writing.
    ///
    /// Returns `None` when no lot has this id.
    async fn preload_lot(&self, id: LotId, patch: &LotPatch) -> StoreResult<Option<Lot>> {
        let lot = self.find_lot(id).await?;
        Ok(lot.map(|mut lot| {
            patch.apply(&mut lot);
            lot
        }))
    }

    /// Write every column of an existing lot, including its foreign keys.
    async fn save_lot(&self, lot: &Lot) -> StoreResult<()>;

    async fn remove_lot(&self, id: LotId) -> StoreResult<()>;

    /// Delete every lot; returns the number of rows removed.
    async fn delete_all_lots(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn insert_department(&self, department: NewDepartment) -> StoreResult<Department>;
    async fn find_department(&self, id: DepartmentId) -> StoreResult<Option<Department>>;
    async fn list_departments(&self) -> StoreResult<Vec<Department>>;
    async fn remove_department(&self, id: DepartmentId) -> StoreResult<()>;
    async fn delete_all_departments(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn insert_asset(&self, asset: NewNationalAsset) -> StoreResult<NationalAsset>;
    async fn find_asset(&self, id: AssetId) -> StoreResult<Option<NationalAsset>>;
    async fn list_assets(&self) -> StoreResult<Vec<NationalAsset>>;
    async fn remove_asset(&self, id: AssetId) -> StoreResult<()>;
    async fn delete_all_assets(&self) -> StoreResult<u64>;
}
