use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use market_application::handler::builtin_handlers;
use market_application::{PromptTemplates, ToolHandler};
use market_core::config::AppConfig;
use market_core::error::MarketError;
use market_core::generation::{
    GenerationOperation, GenerationRequest, GenerationResponse, GenerationService,
};
use market_core::tool::ToolCatalog;
use market_infrastructure::ConfigService;

pub const NO_CREDENTIAL_MESSAGE: &str = "Nenhuma chave de API configurada. Execute `market-suite init` e preencha secret.json, ou defina GEMINI_API_KEY.";

/// Loads config.toml from `home` (or the platform config directory).
pub fn load_config(home: Option<&Path>) -> Result<(ConfigService, AppConfig)> {
    let service = ConfigService::new(home).context("Failed to locate config directory")?;
    let config = service
        .load()
        .with_context(|| format!("Failed to load {}", service.config_path().display()))?;
    Ok((service, config))
}

/// The built-in catalog with the per-tool overrides of `config` applied.
pub fn catalog(config: &AppConfig) -> Result<ToolCatalog> {
    let mut catalog = ToolCatalog::builtin();
    catalog
        .apply_overrides(&config.tools)
        .context("Invalid [tools] section in config.toml")?;
    Ok(catalog)
}

/// Handlers of the implemented tools, by key.
pub fn handlers(config: &AppConfig) -> Result<HashMap<&'static str, Arc<dyn ToolHandler>>> {
    let prompts = Arc::new(PromptTemplates::new()?);
    Ok(builtin_handlers(&config.models, prompts)
        .into_iter()
        .map(|handler| (handler.key(), handler))
        .collect())
}

/// Splits `name=value`. The value may itself contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(&str, &str)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("Expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Missing field name in '{raw}'");
    }
    Ok((name, value))
}

/// Stands in for the API client when no key is configured, so that tools
/// still open and fail with a credential message on submit.
pub struct NoCredentialService;

#[async_trait::async_trait]
impl GenerationService for NoCredentialService {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> market_core::error::Result<GenerationResponse> {
        Err(MarketError::credential(NO_CREDENTIAL_MESSAGE))
    }

    async fn poll_operation(
        &self,
        _operation: &GenerationOperation,
    ) -> market_core::error::Result<GenerationOperation> {
        Err(MarketError::credential(NO_CREDENTIAL_MESSAGE))
    }

    async fn fetch_asset(&self, _uri: &str) -> market_core::error::Result<Vec<u8>> {
        Err(MarketError::credential(NO_CREDENTIAL_MESSAGE))
    }
}
