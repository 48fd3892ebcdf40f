use std::sync::Arc;

use anyhow::Context;

use medsupply_infra::config::AppConfig;
use medsupply_infra::seed::{SeedData, SeedService};
use medsupply_infra::services::{AssetService, DepartmentService, LotService, SupplyService};
use medsupply_infra::store::{
    AssetRepository, DepartmentRepository, InMemoryStore, LotRepository, PostgresStore,
    SupplierRepository, SupplyRepository,
};
use medsupply_observability::{Logger, TracingLogger};

/// Every service the handlers reach, wired against one store.
#[derive(Clone)]
pub struct AppServices {
    pub supplies: Arc<SupplyService>,
    pub lots: Arc<LotService>,
    pub departments: Arc<DepartmentService>,
    pub assets: Arc<AssetService>,
    pub seed: Arc<SeedService>,
}

impl AppServices {
    /// Services over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::wire(Arc::new(InMemoryStore::new()), Arc::new(TracingLogger))
    }

    pub fn wire<S>(store: Arc<S>, logger: Arc<dyn Logger>) -> Self
    where
        S: SupplyRepository
            + SupplierRepository
            + LotRepository
            + DepartmentRepository
            + AssetRepository
            + 'static,
    {
        let supplies = Arc::new(SupplyService::new(store.clone(), logger.clone()));
        let lots = Arc::new(LotService::new(
            supplies.clone(),
            store.clone(),
            store.clone(),
            logger.clone(),
        ));
        let departments = Arc::new(DepartmentService::new(store.clone(), logger.clone()));
        let assets = Arc::new(AssetService::new(store, logger.clone()));
        let seed = Arc::new(SeedService::new(
            supplies.clone(),
            lots.clone(),
            departments.clone(),
            assets.clone(),
            logger,
            SeedData::initial(),
        ));

        Self {
            supplies,
            lots,
            departments,
            assets,
            seed,
        }
    }
}

/// Choose the store from configuration: Postgres when `USE_POSTGRES` is set,
/// in-memory otherwise.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    if !config.use_postgres {
        tracing::info!("using in-memory store");
        return Ok(AppServices::in_memory());
    }

    let db = &config.database;
    let store = PostgresStore::connect(db.connect_options(config.stage), db.max_connections)
        .await
        .with_context(|| format!("failed to connect to Postgres at {}:{}", db.host, db.port))?;
    store
        .ensure_schema()
        .await
        .context("failed to create medsupply tables")?;
    tracing::info!(host = %db.host, database = %db.database, "using Postgres store");

    Ok(AppServices::wire(Arc::new(store), Arc::new(TracingLogger)))
}
