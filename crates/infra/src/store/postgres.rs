//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|-----------------------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation { detail }` |
//! | Database (foreign key violation) | `23503` | `ForeignKeyViolation` |
//! | Database (other) | any other | `Backend` |
//! | PoolClosed / network / decode | N/A | `Backend` |
//!
//! `detail` is Postgres' `DETAIL` field (e.g. `Key (serial_number)=(X) already exists.`),
//! falling back to the primary message when the server sends none.
//!
//! ## Lot listings
//!
//! [`LotQueryPlan`]s are rendered with `sqlx::QueryBuilder`. Column and table
//! identifiers come from closed enums; search terms, limit and offset are
//! always bound parameters.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgConnectOptions, PgDatabaseError, PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use medsupply_assets::{NationalAsset, NewNationalAsset};
use medsupply_core::{AssetId, DepartmentId, LotId, SupplierId, SupplyId};
use medsupply_departments::{Department, NewDepartment};
use medsupply_supplies::query::LOT_JOINS;
use medsupply_supplies::{
    Lot, LotFilter, LotQueryPlan, MatchMode, NewSupplier, NewSupply, SearchPredicate, Supplier,
    Supply, Table, UnsavedLot,
};

use super::{
    AssetRepository, DepartmentRepository, LotRepository, StoreError, StoreResult,
    SupplierRepository, SupplyRepository,
};

/// Postgres-backed store for every record family.
///
/// Uses a SQLx connection pool (`Send + Sync`); each call checks out its own
/// connection, so no locking happens in-process.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool and verify connectivity.
    pub async fn connect(options: PgConnectOptions, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables this store reads and writes, if missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

const SCHEMA: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS medical_supplies (
        id_medical_supplies SERIAL PRIMARY KEY,
        name_material       TEXT NOT NULL UNIQUE,
        description         TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS suppliers (
        id_suppliers  SERIAL PRIMARY KEY,
        name_supplier TEXT NOT NULL,
        phone         TEXT NULL,
        address       TEXT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS lots (
        id_lots             SERIAL PRIMARY KEY,
        stock               INTEGER NOT NULL CHECK (stock >= 0),
        date_delivery       DATE NOT NULL,
        due_date            DATE NOT NULL,
        id_medical_supplies INTEGER NULL REFERENCES medical_supplies (id_medical_supplies),
        id_suppliers        INTEGER NULL REFERENCES suppliers (id_suppliers)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS departments (
        id_departments  SERIAL PRIMARY KEY,
        name_department TEXT NOT NULL UNIQUE,
        description     TEXT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS national_assets (
        id_national_assets SERIAL PRIMARY KEY,
        name_asset         TEXT NOT NULL,
        serial_number      TEXT NOT NULL UNIQUE,
        brand              TEXT NULL,
        model              TEXT NULL,
        acquisition_date   DATE NULL
    )
    "#,
];

const LOT_COLUMNS: &str = "SELECT \
    lots.id_lots, lots.stock, lots.date_delivery, lots.due_date, \
    medical_supply.id_medical_supplies, medical_supply.name_material, medical_supply.description, \
    supplier.id_suppliers, supplier.name_supplier, supplier.phone, supplier.address \
    FROM lots";

/// Primary key of a joined table, also the name of the foreign key on `lots`.
fn join_key(table: Table) -> &'static str {
    match table {
        Table::Lots => "id_lots",
        Table::MedicalSupply => "id_medical_supplies",
        Table::Supplier => "id_suppliers",
    }
}

fn push_lot_select(qb: &mut QueryBuilder<'_, Postgres>, joins: &[Table]) {
    qb.push(LOT_COLUMNS);
    for &table in joins {
        let key = join_key(table);
        qb.push(format_args!(
            " LEFT JOIN {name} {alias} ON {alias}.{key} = lots.{key}",
            name = table.name(),
            alias = table.alias(),
        ));
    }
}

fn predicate_sql(predicate: &SearchPredicate) -> String {
    let column = predicate.field.qualify();
    match predicate.mode {
        MatchMode::Text => format!("{column}::text"),
        MatchMode::CaseInsensitive => format!("UPPER({column})"),
    }
}

/// Render a plan into a bound query.
fn build_lot_query(plan: &LotQueryPlan) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("");
    push_lot_select(&mut qb, &plan.joins);

    if let LotFilter::AnyOf(predicates) = &plan.filter {
        qb.push(" WHERE ");
        for (i, predicate) in predicates.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(predicate_sql(predicate))
                .push(" LIKE ")
                .push_bind(predicate.like_pattern())
                .push(" ESCAPE '\\'");
        }
    }

    qb.push(format_args!(
        " ORDER BY {} {}, {} ASC",
        plan.order_by(),
        plan.order.as_sql(),
        plan.tiebreaker()
    ));
    qb.push(" LIMIT ")
        .push_bind(i64::from(plan.limit))
        .push(" OFFSET ")
        .push_bind(i64::from(plan.offset));
    qb
}

/// One row of the joined lot listing.
#[derive(Debug)]
struct LotJoinRow {
    id_lots: i32,
    stock: i32,
    date_delivery: NaiveDate,
    due_date: NaiveDate,
    id_medical_supplies: Option<i32>,
    name_material: Option<String>,
    description: Option<String>,
    id_suppliers: Option<i32>,
    name_supplier: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

impl<'r> FromRow<'r, PgRow> for LotJoinRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(LotJoinRow {
            id_lots: row.try_get("id_lots")?,
            stock: row.try_get("stock")?,
            date_delivery: row.try_get("date_delivery")?,
            due_date: row.try_get("due_date")?,
            id_medical_supplies: row.try_get("id_medical_supplies")?,
            name_material: row.try_get("name_material")?,
            description: row.try_get("description")?,
            id_suppliers: row.try_get("id_suppliers")?,
            name_supplier: row.try_get("name_supplier")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
        })
    }
}

impl TryFrom<LotJoinRow> for Lot {
    type Error = StoreError;

    fn try_from(row: LotJoinRow) -> Result<Self, Self::Error> {
        let medical_supply = match (row.id_medical_supplies, row.name_material, row.description) {
            (Some(id), Some(name_material), Some(description)) => Supply {
                id_medical_supplies: SupplyId::new(id),
                name_material,
                description,
            },
            _ => {
                return Err(StoreError::backend(format!(
                    "lot {} has no medical supply",
                    row.id_lots
                )));
            }
        };
        let supplier = match (row.id_suppliers, row.name_supplier) {
            (Some(id), Some(name_supplier)) => Some(Supplier {
                id_suppliers: SupplierId::new(id),
                name_supplier,
                phone: row.phone,
                address: row.address,
            }),
            _ => None,
        };

        Ok(Lot {
            id_lots: LotId::new(row.id_lots),
            stock: row.stock,
            date_delivery: row.date_delivery,
            due_date: row.due_date,
            medical_supply,
            supplier,
        })
    }
}

fn lot_from_row(row: &PgRow) -> StoreResult<Lot> {
    let joined = LotJoinRow::from_row(row)
        .map_err(|e| StoreError::backend(format!("failed to decode lot row: {e}")))?;
    Lot::try_from(joined)
}

fn supply_from_row(row: &PgRow) -> Result<Supply, sqlx::Error> {
    Ok(Supply {
        id_medical_supplies: SupplyId::new(row.try_get("id_medical_supplies")?),
        name_material: row.try_get("name_material")?,
        description: row.try_get("description")?,
    })
}

fn supplier_from_row(row: &PgRow) -> Result<Supplier, sqlx::Error> {
    Ok(Supplier {
        id_suppliers: SupplierId::new(row.try_get("id_suppliers")?),
        name_supplier: row.try_get("name_supplier")?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
    })
}

fn department_from_row(row: &PgRow) -> Result<Department, sqlx::Error> {
    Ok(Department {
        id_departments: DepartmentId::new(row.try_get("id_departments")?),
        name_department: row.try_get("name_department")?,
        description: row.try_get("description")?,
    })
}

fn asset_from_row(row: &PgRow) -> Result<NationalAsset, sqlx::Error> {
    Ok(NationalAsset {
        id_national_assets: AssetId::new(row.try_get("id_national_assets")?),
        name_asset: row.try_get("name_asset")?,
        serial_number: row.try_get("serial_number")?,
        brand: row.try_get("brand")?,
        model: row.try_get("model")?,
        acquisition_date: row.try_get("acquisition_date")?,
    })
}

fn decode<T>(operation: &str, result: Result<T, sqlx::Error>) -> StoreResult<T> {
    result.map_err(|e| StoreError::backend(format!("failed to decode row in {operation}: {e}")))
}

#[async_trait]
impl SupplyRepository for PostgresStore {
    #[instrument(skip(self, supply), err)]
    async fn insert_supply(&self, supply: NewSupply) -> StoreResult<Supply> {
        let row = sqlx::query(
            r#"
            INSERT INTO medical_supplies (name_material, description)
            VALUES ($1, $2)
            RETURNING id_medical_supplies, name_material, description
            "#,
        )
        .bind(&supply.name_material)
        .bind(&supply.description)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_supply", e))?;
        decode("insert_supply", supply_from_row(&row))
    }

    #[instrument(skip(self), err)]
    async fn find_supply(&self, id: SupplyId) -> StoreResult<Option<Supply>> {
        let row = sqlx::query(
            r#"
            SELECT id_medical_supplies, name_material, description
            FROM medical_supplies
            WHERE id_medical_supplies = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_supply", e))?;
        row.map(|r| decode("find_supply", supply_from_row(&r)))
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_supplies(&self, offset: u32, limit: u32) -> StoreResult<Vec<Supply>> {
        let rows = sqlx::query(
            r#"
            SELECT id_medical_supplies, name_material, description
            FROM medical_supplies
            ORDER BY id_medical_supplies ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_supplies", e))?;
        rows.iter()
            .map(|r| decode("list_supplies", supply_from_row(r)))
            .collect()
    }

    #[instrument(skip(self, supply), fields(id = %supply.id_medical_supplies), err)]
    async fn save_supply(&self, supply: &Supply) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE medical_supplies
            SET name_material = $2, description = $3
            WHERE id_medical_supplies = $1
            "#,
        )
        .bind(supply.id_medical_supplies.get())
        .bind(&supply.name_material)
        .bind(&supply.description)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_supply", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn remove_supply(&self, id: SupplyId) -> StoreResult<()> {
        sqlx::query("DELETE FROM medical_supplies WHERE id_medical_supplies = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_supply", e))?;
        Ok(())
    }
}

#[async_trait]
impl SupplierRepository for PostgresStore {
    #[instrument(skip(self, supplier), err)]
    async fn insert_supplier(&self, supplier: NewSupplier) -> StoreResult<Supplier> {
        let row = sqlx::query(
            r#"
            INSERT INTO suppliers (name_supplier, phone, address)
            VALUES ($1, $2, $3)
            RETURNING id_suppliers, name_supplier, phone, address
            "#,
        )
        .bind(&supplier.name_supplier)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_supplier", e))?;
        decode("insert_supplier", supplier_from_row(&row))
    }

    #[instrument(skip(self), err)]
    async fn find_supplier(&self, id: SupplierId) -> StoreResult<Option<Supplier>> {
        let row = sqlx::query(
            r#"
            SELECT id_suppliers, name_supplier, phone, address
            FROM suppliers
            WHERE id_suppliers = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_supplier", e))?;
        row.map(|r| decode("find_supplier", supplier_from_row(&r)))
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_suppliers(&self) -> StoreResult<Vec<Supplier>> {
        let rows = sqlx::query(
            "SELECT id_suppliers, name_supplier, phone, address FROM suppliers ORDER BY id_suppliers ASC",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_suppliers", e))?;
        rows.iter()
            .map(|r| decode("list_suppliers", supplier_from_row(r)))
            .collect()
    }
}

#[async_trait]
impl LotRepository for PostgresStore {
    #[instrument(
        skip(self, lot),
        fields(supply_id = %lot.medical_supply.id_medical_supplies),
        err
    )]
    async fn insert_lot(&self, lot: UnsavedLot) -> StoreResult<Lot> {
        let row = sqlx::query(
            r#"
            INSERT INTO lots (stock, date_delivery, due_date, id_medical_supplies, id_suppliers)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id_lots
            "#,
        )
        .bind(lot.stock)
        .bind(lot.date_delivery)
        .bind(lot.due_date)
        .bind(lot.medical_supply.id_medical_supplies.get())
        .bind(lot.supplier.as_ref().map(|s| s.id_suppliers.get()))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_lot", e))?;

        let id: i32 = decode("insert_lot", row.try_get("id_lots"))?;
        Ok(lot.with_id(LotId::new(id)))
    }

    #[instrument(skip(self), err)]
    async fn find_lot(&self, id: LotId) -> StoreResult<Option<Lot>> {
        let mut qb = QueryBuilder::new("");
        push_lot_select(&mut qb, &LOT_JOINS);
        qb.push(" WHERE lots.id_lots = ").push_bind(id.get());

        let row = qb
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_lot", e))?;
        row.as_ref().map(lot_from_row).transpose()
    }

    #[instrument(
        skip(self, plan),
        fields(sort = %plan.order_by(), search = plan.is_search(), limit = plan.limit, offset = plan.offset),
        err
    )]
    async fn find_lots(&self, plan: &LotQueryPlan) -> StoreResult<Vec<Lot>> {
        let mut qb = build_lot_query(plan);
        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_lots", e))?;
        rows.iter().map(lot_from_row).collect()
    }

    #[instrument(skip(self, lot), fields(id = %lot.id_lots), err)]
    async fn save_lot(&self, lot: &Lot) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE lots
            SET stock = $2,
                date_delivery = $3,
                due_date = $4,
                id_medical_supplies = $5,
                id_suppliers = $6
            WHERE id_lots = $1
            "#,
        )
        .bind(lot.id_lots.get())
        .bind(lot.stock)
        .bind(lot.date_delivery)
        .bind(lot.due_date)
        .bind(lot.medical_supply.id_medical_supplies.get())
        .bind(lot.supplier_id().map(SupplierId::get))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_lot", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn remove_lot(&self, id: LotId) -> StoreResult<()> {
        sqlx::query("DELETE FROM lots WHERE id_lots = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_lot", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_all_lots(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM lots")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_all_lots", e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl DepartmentRepository for PostgresStore {
    #[instrument(skip(self, department), err)]
    async fn insert_department(&self, department: NewDepartment) -> StoreResult<Department> {
        let row = sqlx::query(
            r#"
            INSERT INTO departments (name_department, description)
            VALUES ($1, $2)
            RETURNING id_departments, name_department, description
            "#,
        )
        .bind(&department.name_department)
        .bind(&department.description)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_department", e))?;
        decode("insert_department", department_from_row(&row))
    }

    #[instrument(skip(self), err)]
    async fn find_department(&self, id: DepartmentId) -> StoreResult<Option<Department>> {
        let row = sqlx::query(
            r#"
            SELECT id_departments, name_department, description
            FROM departments
            WHERE id_departments = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_department", e))?;
        row.map(|r| decode("find_department", department_from_row(&r)))
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        let rows = sqlx::query(
            "SELECT id_departments, name_department, description FROM departments ORDER BY id_departments ASC",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_departments", e))?;
        rows.iter()
            .map(|r| decode("list_departments", department_from_row(r)))
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn remove_department(&self, id: DepartmentId) -> StoreResult<()> {
        sqlx::query("DELETE FROM departments WHERE id_departments = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_department", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_all_departments(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM departments")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_all_departments", e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl AssetRepository for PostgresStore {
    #[instrument(skip(self, asset), fields(serial_number = %asset.serial_number), err)]
    async fn insert_asset(&self, asset: NewNationalAsset) -> StoreResult<NationalAsset> {
        let row = sqlx::query(
            r#"
            INSERT INTO national_assets (name_asset, serial_number, brand, model, acquisition_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id_national_assets, name_asset, serial_number, brand, model, acquisition_date
            "#,
        )
        .bind(&asset.name_asset)
        .bind(&asset.serial_number)
        .bind(&asset.brand)
        .bind(&asset.model)
        .bind(asset.acquisition_date)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_asset", e))?;
        decode("insert_asset", asset_from_row(&row))
    }

    #[instrument(skip(self), err)]
    async fn find_asset(&self, id: AssetId) -> StoreResult<Option<NationalAsset>> {
        let row = sqlx::query(
            r#"
            SELECT id_national_assets, name_asset, serial_number, brand, model, acquisition_date
            FROM national_assets
            WHERE id_national_assets = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_asset", e))?;
        row.map(|r| decode("find_asset", asset_from_row(&r)))
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_assets(&self) -> StoreResult<Vec<NationalAsset>> {
        let rows = sqlx::query(
            r#"
            SELECT id_national_assets, name_asset, serial_number, brand, model, acquisition_date
            FROM national_assets
            ORDER BY id_national_assets ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_assets", e))?;
        rows.iter()
            .map(|r| decode("list_assets", asset_from_row(r)))
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn remove_asset(&self, id: AssetId) -> StoreResult<()> {
        sqlx::query("DELETE FROM national_assets WHERE id_national_assets = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_asset", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_all_assets(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM national_assets")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_all_assets", e))?;
        Ok(result.rows_affected())
    }
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let detail = db_err
                .try_downcast_ref::<PgDatabaseError>()
                .and_then(PgDatabaseError::detail)
                .unwrap_or_else(|| db_err.message())
                .to_string();

            match db_err.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation { detail },
                Some("23503") => StoreError::ForeignKeyViolation(detail),
                _ => StoreError::Backend(format!(
                    "database error in {}: {}",
                    operation,
                    db_err.message()
                )),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
