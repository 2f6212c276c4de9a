//! Application state wiring the engine to its infrastructure.
//!
//! AppState holds the settings, resolved credentials, conversation store
//! and the orchestration controller pinned to the HTTP provider factory.

use std::sync::Arc;
use std::time::Duration;

use confab_core::llm::gateway::ProviderGateway;
use confab_core::orchestration::{OrchestrationController, RespondContext};
use confab_infra::config::load_settings;
use confab_infra::credential::resolve_credentials;
use confab_infra::llm::HttpProviderFactory;
use confab_infra::paths::{chats_path, resolve_data_dir};
use confab_infra::store::{ChatDocument, JsonDocumentStore};
use confab_types::config::Settings;

pub struct AppState {
    pub settings: Settings,
    pub store: JsonDocumentStore,
    pub controller: OrchestrationController,
    pub context: RespondContext,
}

impl AppState {
    /// Load settings and credentials, wire the gateway and controller.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let settings = load_settings(&data_dir).await;
        let credentials = resolve_credentials(&settings);

        let factory = HttpProviderFactory::new(settings.providers.clone())?;
        let gateway =
            ProviderGateway::new(Arc::new(factory)).with_max_tokens(settings.max_output_tokens);
        let controller = OrchestrationController::new(gateway);
        let context = RespondContext::new(credentials, settings.global_instructions.clone());

        tracing::debug!(data_dir = %data_dir.display(), "application state ready");

        Ok(Self {
            store: JsonDocumentStore::new(chats_path(&data_dir)),
            settings,
            controller,
            context,
        })
    }

    pub fn auto_flow_delay(&self) -> Duration {
        Duration::from_millis(self.settings.auto_flow_delay_ms)
    }

    pub async fn load(&self) -> anyhow::Result<ChatDocument> {
        Ok(self.store.load().await?)
    }

    pub async fn save(&self, document: &ChatDocument) -> anyhow::Result<()> {
        Ok(self.store.save(document).await?)
    }
}
