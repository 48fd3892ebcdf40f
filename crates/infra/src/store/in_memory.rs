use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use medsupply_assets::{NationalAsset, NewNationalAsset};
use medsupply_core::{AssetId, DepartmentId, LotId, SupplierId, SupplyId};
use medsupply_departments::{Department, NewDepartment};
use medsupply_supplies::{
    Lot, LotQueryPlan, NewSupplier, NewSupply, Supplier, Supply, UnsavedLot,
};

use super::{
    AssetRepository, DepartmentRepository, LotRepository, StoreError, StoreResult,
    SupplierRepository, SupplyRepository,
};

/// In-memory relational store.
///
/// Intended for tests/dev. Mirrors the constraints of the Postgres schema:
/// serial ids that are never reused, unique `name_material`,
/// `name_department` and `serial_number`, and a foreign key from lots to
/// supplies. Lot listings run the query plan over rows hydrated with a left
/// join on supplies and suppliers.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }
}

#[derive(Debug)]
struct Table<V> {
    rows: BTreeMap<i32, V>,
    next_id: i32,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<V> Table<V> {
    /// Serial ids keep counting after deletes, like a Postgres sequence.
    fn allocate(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn clear(&mut self) -> u64 {
        let removed = self.rows.len() as u64;
        self.rows.clear();
        removed
    }
}

#[derive(Debug, Clone)]
struct LotRow {
    id: LotId,
    stock: i32,
    date_delivery: NaiveDate,
    due_date: NaiveDate,
    supply_id: SupplyId,
    supplier_id: Option<SupplierId>,
}

impl LotRow {
    fn from_lot(lot: &Lot) -> Self {
        Self {
            id: lot.id_lots,
            stock: lot.stock,
            date_delivery: lot.date_delivery,
            due_date: lot.due_date,
            supply_id: lot.medical_supply.id_medical_supplies,
            supplier_id: lot.supplier_id(),
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    supplies: Table<Supply>,
    suppliers: Table<Supplier>,
    lots: Table<LotRow>,
    departments: Table<Department>,
    assets: Table<NationalAsset>,
}

fn duplicate(column: &str, value: &str) -> StoreError {
    StoreError::unique(format!("Key ({column})=({value}) already exists."))
}

impl Tables {
    /// `lots LEFT JOIN medical_supplies LEFT JOIN suppliers`.
    fn hydrate(&self, row: &LotRow) -> StoreResult<Lot> {
        let medical_supply = self
            .supplies
            .rows
            .get(&row.supply_id.get())
            .cloned()
            .ok_or_else(|| {
                StoreError::backend(format!(
                    "lot {} references missing medical supply {}",
                    row.id, row.supply_id
                ))
            })?;
        let supplier = row
            .supplier_id
            .and_then(|id| self.suppliers.rows.get(&id.get()).cloned());

        Ok(Lot {
            id_lots: row.id,
            stock: row.stock,
            date_delivery: row.date_delivery,
            due_date: row.due_date,
            medical_supply,
            supplier,
        })
    }

    fn check_lot_references(
        &self,
        supply_id: SupplyId,
        supplier_id: Option<SupplierId>,
    ) -> StoreResult<()> {
        if !self.supplies.rows.contains_key(&supply_id.get()) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "Key (id_medical_supplies)=({supply_id}) is not present in table \"medical_supplies\"."
            )));
        }
        if let Some(id) = supplier_id {
            if !self.suppliers.rows.contains_key(&id.get()) {
                return Err(StoreError::ForeignKeyViolation(format!(
                    "Key (id_suppliers)=({id}) is not present in table \"suppliers\"."
                )));
            }
        }
        Ok(())
    }

    fn check_supply_name(&self, name: &str, except: Option<SupplyId>) -> StoreResult<()> {
        let taken = self
            .supplies
            .rows
            .values()
            .any(|s| s.name_material == name && Some(s.id_medical_supplies) != except);
        if taken {
            return Err(duplicate("name_material", name));
        }
        Ok(())
    }
}

#[async_trait]
impl SupplyRepository for InMemoryStore {
    async fn insert_supply(&self, supply: NewSupply) -> StoreResult<Supply> {
        let mut tables = self.write()?;
        tables.check_supply_name(&supply.name_material, None)?;
        let id = SupplyId::new(tables.supplies.allocate());
        let supply = supply.into_supply(id);
        tables.supplies.rows.insert(id.get(), supply.clone());
        Ok(supply)
    }

    async fn find_supply(&self, id: SupplyId) -> StoreResult<Option<Supply>> {
        Ok(self.read()?.supplies.rows.get(&id.get()).cloned())
    }

    async fn list_supplies(&self, offset: u32, limit: u32) -> StoreResult<Vec<Supply>> {
        Ok(self
            .read()?
            .supplies
            .rows
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn save_supply(&self, supply: &Supply) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables.check_supply_name(&supply.name_material, Some(supply.id_medical_supplies))?;
        tables
            .supplies
            .rows
            .insert(supply.id_medical_supplies.get(), supply.clone());
        Ok(())
    }

    async fn remove_supply(&self, id: SupplyId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.lots.rows.values().any(|l| l.supply_id == id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "Key (id_medical_supplies)=({id}) is still referenced from table \"lots\"."
            )));
        }
        tables.supplies.rows.remove(&id.get());
        Ok(())
    }
}

#[async_trait]
impl SupplierRepository for InMemoryStore {
    async fn insert_supplier(&self, supplier: NewSupplier) -> StoreResult<Supplier> {
        let mut tables = self.write()?;
        let id = SupplierId::new(tables.suppliers.allocate());
        let supplier = supplier.into_supplier(id);
        tables.suppliers.rows.insert(id.get(), supplier.clone());
        Ok(supplier)
    }

    async fn find_supplier(&self, id: SupplierId) -> StoreResult<Option<Supplier>> {
        Ok(self.read()?.suppliers.rows.get(&id.get()).cloned())
    }

    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        Ok(self.read()?.suppliers.rows.values().cloned().collect())
    }
}

#[async_trait]
impl LotRepository for InMemoryStore {
    async fn insert_lot(&self, lot: UnsavedLot) -> StoreResult<Lot> {
        let mut tables = self.write()?;
        let supply_id = lot.medical_supply.id_medical_supplies;
        let supplier_id = lot.supplier.as_ref().map(|s| s.id_suppliers);
        tables.check_lot_references(supply_id, supplier_id)?;

        let lot = lot.with_id(LotId::new(tables.lots.allocate()));
        tables.lots.rows.insert(lot.id_lots.get(), LotRow::from_lot(&lot));
        Ok(lot)
    }

    async fn find_lot(&self, id: LotId) -> StoreResult<Option<Lot>> {
        let tables = self.read()?;
        tables
            .lots
            .rows
            .get(&id.get())
            .map(|row| tables.hydrate(row))
            .transpose()
    }

    async fn find_lots(&self, plan: &LotQueryPlan) -> StoreResult<Vec<Lot>> {
        let tables = self.read()?;
        let hydrated = tables
            .lots
            .rows
            .values()
            .map(|row| tables.hydrate(row))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(plan.execute(hydrated))
    }

    async fn save_lot(&self, lot: &Lot) -> StoreResult<()> {
        let mut tables = self.write()?;
        let row = LotRow::from_lot(lot);
        tables.check_lot_references(row.supply_id, row.supplier_id)?;
        tables.lots.rows.insert(row.id.get(), row);
        Ok(())
    }

    async fn remove_lot(&self, id: LotId) -> StoreResult<()> {
        self.write()?.lots.rows.remove(&id.get());
        Ok(())
    }

    async fn delete_all_lots(&self) -> StoreResult<u64> {
        Ok(self.write()?.lots.clear())
    }
}

#[async_trait]
impl DepartmentRepository for InMemoryStore {
    async fn insert_department(&self, department: NewDepartment) -> StoreResult<Department> {
        let mut tables = self.write()?;
        if tables
            .departments
            .rows
            .values()
            .any(|d| d.name_department == department.name_department)
        {
            return Err(duplicate("name_department", &department.name_department));
        }
        let id = DepartmentId::new(tables.departments.allocate());
        let department = department.into_department(id);
        tables.departments.rows.insert(id.get(), department.clone());
        Ok(department)
    }

    async fn find_department(&self, id: DepartmentId) -> StoreResult<Option<Department>> {
        Ok(self.read()?.departments.rows.get(&id.get()).cloned())
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        Ok(self.read()?.departments.rows.values().cloned().collect())
    }

    async fn remove_department(&self, id: DepartmentId) -> StoreResult<()> {
        self.write()?.departments.rows.remove(&id.get());
        Ok(())
    }

    async fn delete_all_departments(&self) -> StoreResult<u64> {
        Ok(self.write()?.departments.clear())
    }
}

#[async_trait]
impl AssetRepository for InMemoryStore {
    async fn insert_asset(&self, asset: NewNationalAsset) -> StoreResult<NationalAsset> {
        let mut tables = self.write()?;
        if tables
            .assets
            .rows
            .values()
            .any(|a| a.serial_number == asset.serial_number)
        {
            return Err(duplicate("serial_number", &asset.serial_number));
        }
        let id = AssetId::new(tables.assets.allocate());
        let asset = asset.into_asset(id);
        tables.assets.rows.insert(id.get(), asset.clone());
        Ok(asset)
    }

    async fn find_asset(&self, id: AssetId) -> StoreResult<Option<NationalAsset>> {
        Ok(self.read()?.assets.rows.get(&id.get()).cloned())
    }

    async fn list_assets(&self) -> StoreResult<Vec<NationalAsset>> {
        Ok(self.read()?.assets.rows.values().cloned().collect())
    }

    async fn remove_asset(&self, id: AssetId) -> StoreResult<()> {
        self.write()?.assets.rows.remove(&id.get());
        Ok(())
    }

    async fn delete_all_assets(&self) -> StoreResult<u64> {
        Ok(self.write()?.assets.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medsupply_supplies::{LotPatch, NewLot, PaginationRequest};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_supply(name: &str) -> NewSupply {
        NewSupply {
            name_material: name.to_string(),
            description: format!("{name} description"),
        }
    }

    fn new_lot(stock: i32) -> NewLot {
        NewLot {
            stock,
            date_delivery: date(2024, 5, 1),
            due_date: date(2026, 5, 1),
        }
    }

    #[tokio::test]
    async fn duplicate_supply_name_is_a_unique_violation() {
        let store = InMemoryStore::new();
        store.insert_supply(new_supply("Gauze")).await.unwrap();
        let err = store.insert_supply(new_supply("Gauze")).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::unique("Key (name_material)=(Gauze) already exists.")
        );
    }

    #[tokio::test]
    async fn lots_come_back_hydrated_and_left_joined() {
        let store = InMemoryStore::new();
        let supply = store.insert_supply(new_supply("Gauze")).await.unwrap();
        let lot = store
            .insert_lot(new_lot(10).attach(supply.clone(), None))
            .await
            .unwrap();

        let found = store.find_lot(lot.id_lots).await.unwrap().unwrap();
        assert_eq!(found.medical_supply, supply);
        assert!(found.supplier.is_none());

        let all = store
            .find_lots(&LotQueryPlan::from_request(&PaginationRequest::default()))
            .await
            .unwrap();
        assert_eq!(all, vec![found]);
    }

    #[tokio::test]
    async fn referenced_supply_cannot_be_removed() {
        let store = InMemoryStore::new();
        let supply = store.insert_supply(new_supply("Gauze")).await.unwrap();
        store
            .insert_lot(new_lot(1).attach(supply.clone(), None))
            .await
            .unwrap();

        let err = store.remove_supply(supply.id_medical_supplies).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn preload_merges_without_writing() {
        let store = InMemoryStore::new();
        let supply = store.insert_supply(new_supply("Gauze")).await.unwrap();
        let lot = store.insert_lot(new_lot(10).attach(supply, None)).await.unwrap();

        let patch = LotPatch {
            stock: Some(99),
            ..Default::default()
        };
        let merged = store.preload_lot(lot.id_lots, &patch).await.unwrap().unwrap();
        assert_eq!(merged.stock, 99);

        let stored = store.find_lot(lot.id_lots).await.unwrap().unwrap();
        assert_eq!(stored.stock, 10);

        assert!(store.preload_lot(LotId::new(404), &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_bulk_delete() {
        let store = InMemoryStore::new();
        let supply = store.insert_supply(new_supply("Gauze")).await.unwrap();
        let first = store
            .insert_lot(new_lot(1).attach(supply.clone(), None))
            .await
            .unwrap();
        assert_eq!(store.delete_all_lots().await.unwrap(), 1);

        let second = store.insert_lot(new_lot(2).attach(supply, None)).await.unwrap();
        assert!(second.id_lots > first.id_lots);
    }
}
