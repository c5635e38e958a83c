use std::sync::Arc;

use crate::clients::CompletionClient;
use crate::config::{CompletionConfig, Config};
use crate::db::Store;
use crate::services::{
    AuthService, ExpansionService, IdeaService, SeaOrmAuthService, SeaOrmIdeaService,
};

/// Everything the handlers need, wired once at startup.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub completion: Arc<CompletionClient>,

    pub auth_service: Arc<dyn AuthService>,

    pub idea_service: Arc<dyn IdeaService>,

    pub expansion: Arc<ExpansionService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let completion_config = config.completion.clone().with_env_overrides();
        let completion = Arc::new(CompletionClient::new(
            &completion_config,
            CompletionConfig::api_key_from_env(),
        )?);

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let idea_service = Arc::new(SeaOrmIdeaService::new(store.clone())) as Arc<dyn IdeaService>;

        let expansion = Arc::new(ExpansionService::new(store.clone(), completion.clone()));

        Ok(Self {
            config,
            store,
            completion,
            auth_service,
            idea_service,
            expansion,
        })
    }
}
