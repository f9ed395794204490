use std::sync::Arc;

use catalog_infra::{
    InMemoryProductRepository, LifecycleService, PostgresProductRepository, ProductRepository,
    StoreBackend, StoreConfig, StoreError,
};

/// Lifecycle service over whichever repository was configured at bootstrap.
pub type CatalogService = LifecycleService<Arc<dyn ProductRepository>>;

/// Everything the HTTP handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub catalog: CatalogService,
}

impl AppServices {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self {
            catalog: LifecycleService::new(repo),
        }
    }
}

pub async fn build_services(config: &StoreConfig) -> Result<AppServices, StoreError> {
    match &config.backend {
        StoreBackend::InMemory => Ok(build_in_memory_services()),
        StoreBackend::Postgres { database_url } => {
            build_persistent_services(database_url, config).await
        }
    }
}

pub fn build_in_memory_services() -> AppServices {
    tracing::info!("using in-memory product store");
    AppServices::new(Arc::new(InMemoryProductRepository::new()))
}

async fn build_persistent_services(
    database_url: &str,
    config: &StoreConfig,
) -> Result<AppServices, StoreError> {
    let repo = PostgresProductRepository::connect(
        database_url,
        &config.products_table,
        config.max_connections,
    )
    .await?;
    repo.ensure_schema().await?;

    tracing::info!(table = %repo.table(), "using postgres product store");
    Ok(AppServices::new(Arc::new(repo)))
}
