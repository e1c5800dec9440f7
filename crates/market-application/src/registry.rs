//! Resolves catalog keys to openable tools.

use std::collections::HashMap;
use std::sync::Arc;

use market_core::config::AppConfig;
use market_core::error::{MarketError, Result};
use market_core::generation::GenerationService;
use market_core::invocation::{CredentialStatus, PollPolicy};
use market_core::tool::{ToolCatalog, ToolDescriptor};

use crate::controller::LifecycleController;
use crate::handler::{ToolHandler, builtin_handlers};
use crate::prompt::PromptTemplates;

/// Shown for catalog entries that have no implementation yet.
pub const COMING_SOON_MESSAGE: &str =
    "Esta ferramenta está em desenvolvimento e estará disponível em breve.";

/// What opening a tool yields.
pub enum ToolView {
    /// An implemented tool with a fresh invocation state.
    Form(LifecycleController),
    /// The tool is hosted elsewhere; navigate to `url`.
    Redirect {
        descriptor: ToolDescriptor,
        url: String,
    },
    /// Listed in the catalog but not implemented.
    ComingSoon { descriptor: ToolDescriptor },
}

impl ToolView {
    pub fn descriptor(&self) -> &ToolDescriptor {
        match self {
            Self::Form(controller) => controller.descriptor(),
            Self::Redirect { descriptor, .. } | Self::ComingSoon { descriptor } => descriptor,
        }
    }
}

impl std::fmt::Debug for ToolView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Form(controller) => f.debug_tuple("Form").field(&controller.key()).finish(),
            Self::Redirect { descriptor, url } => f
                .debug_struct("Redirect")
                .field("key", &descriptor.key)
                .field("url", url)
                .finish(),
            Self::ComingSoon { descriptor } => f
                .debug_struct("ComingSoon")
                .field("key", &descriptor.key)
                .finish(),
        }
    }
}

/// Catalog plus the handlers of implemented tools.
pub struct ToolRegistry {
    catalog: ToolCatalog,
    handlers: HashMap<&'static str, Arc<dyn ToolHandler>>,
    service: Arc<dyn GenerationService>,
    policy: PollPolicy,
    credential: CredentialStatus,
}

impl ToolRegistry {
    /// An empty registry: every inline tool opens as "coming soon".
    pub fn new(catalog: ToolCatalog, service: Arc<dyn GenerationService>) -> Self {
        Self {
            catalog,
            handlers: HashMap::new(),
            service,
            policy: PollPolicy::default(),
            credential: CredentialStatus::default(),
        }
    }

    /// The built-in catalog and handlers, configured from `config`.
    pub fn builtin(config: &AppConfig, service: Arc<dyn GenerationService>) -> Result<Self> {
        let mut catalog = ToolCatalog::builtin();
        catalog.apply_overrides(&config.tools)?;

        let prompts = Arc::new(PromptTemplates::new()?);
        let mut registry =
            Self::new(catalog, service).with_poll_policy(config.polling.to_policy());
        for handler in builtin_handlers(&config.models, prompts) {
            registry.register(handler)?;
        }
        Ok(registry)
    }

    /// Adds a handler. Its key must be listed in the catalog.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) -> Result<()> {
        let key = handler.key();
        if self.catalog.get(key).is_none() {
            return Err(MarketError::not_found("tool", key));
        }
        tracing::debug!(tool = key, "Registered tool handler");
        self.handlers.insert(key, handler);
        Ok(())
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Credential status handed to every opened tool.
    pub fn with_credential(mut self, credential: CredentialStatus) -> Self {
        self.credential = credential;
        self
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn handler(&self, key: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.handlers.get(key)
    }

    pub fn is_implemented(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Opens a tool by key.
    ///
    /// Redirects win over handlers. Each `Form` gets its own fresh state.
    pub fn open(&self, key: &str) -> Result<ToolView> {
        let descriptor = self
            .catalog
            .get(key)
            .cloned()
            .ok_or_else(|| MarketError::not_found("tool", key))?;

        if let Some(url) = descriptor.redirect_url() {
            let url = url.to_string();
            tracing::info!(tool = key, url = %url, "Opening external tool");
            return Ok(ToolView::Redirect { descriptor, url });
        }

        match self.handlers.get(key) {
            Some(handler) => {
                tracing::debug!(tool = key, "Opening tool");
                let controller =
                    LifecycleController::new(descriptor, handler.clone(), self.service.clone())
                        .with_poll_policy(self.policy)
                        .with_credential(self.credential);
                Ok(ToolView::Form(controller))
            }
            None => {
                tracing::debug!(tool = key, "Tool not implemented yet");
                Ok(ToolView::ComingSoon { descriptor })
            }
        }
    }
}
