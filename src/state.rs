use std::sync::Arc;

use crate::clients::ClassifierClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, ComplaintService, SeaOrmAuthService, SeaOrmComplaintService,
};

/// Build a shared HTTP client with the configured classifier timeout.
/// Reused for every outbound call to enable connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Complainr/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Explicitly constructed dependencies, passed to every component that
/// needs them. There is no ambient global state: handlers reach the store
/// and services only through this struct.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub classifier: Arc<ClassifierClient>,

    pub auth_service: Arc<dyn AuthService>,

    pub complaint_service: Arc<dyn ComplaintService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(config.classifier.timeout_seconds)?;
        let classifier = Arc::new(ClassifierClient::with_shared_client(
            http_client,
            &config.classifier,
        ));

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone(), config.auth.clone()))
            as Arc<dyn AuthService + 'static>;

        let complaint_service = Arc::new(SeaOrmComplaintService::new(
            store.clone(),
            classifier.clone(),
            config.general.records_per_page,
            config.general.recent_limit,
        )) as Arc<dyn ComplaintService + 'static>;

        Ok(Self {
            config,
            store,
            classifier,
            auth_service,
            complaint_service,
        })
    }
}
