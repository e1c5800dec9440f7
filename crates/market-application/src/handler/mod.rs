//! Tool handlers: per-tool fields, validation and request building.
//!
//! A handler is stateless. The [`LifecycleController`](crate::LifecycleController)
//! owns the invocation state and calls into the handler at each step.

mod background_remover;
mod marketing_content;
mod mockup_3d;
mod notification;
mod pix_receipt;
mod visual_variations;

use std::sync::Arc;

use market_core::config::ModelConfig;
use market_core::error::{MarketError, Result};
use market_core::generation::{GenerationOutput, GenerationRequest};
use market_core::invocation::{FieldSpec, ToolInvocationState};

use crate::prompt::PromptTemplates;

pub use background_remover::BackgroundRemoverHandler;
pub use marketing_content::MarketingContentHandler;
pub use mockup_3d::{Mockup3dHandler, RENDERING_MESSAGES};
pub use notification::NotificationHandler;
pub use pix_receipt::PixReceiptHandler;
pub use visual_variations::VisualVariationsHandler;

/// Per-tool behavior plugged into the generic lifecycle.
pub trait ToolHandler: Send + Sync {
    /// Catalog key of the tool.
    fn key(&self) -> &'static str;

    /// Form fields, in display order.
    fn fields(&self) -> Vec<FieldSpec>;

    /// Shown when required input is missing.
    fn validation_message(&self) -> &'static str;

    /// Shown for any failure after the request was issued.
    fn generic_failure(&self) -> &'static str;

    /// Presence checks only; values are passed through as-is.
    fn validate(&self, state: &ToolInvocationState) -> Result<()> {
        let missing = self
            .fields()
            .into_iter()
            .any(|spec| spec.required && !state.has_value(&spec.name));
        if missing {
            return Err(MarketError::validation(self.validation_message()));
        }
        Ok(())
    }

    fn build_request(&self, state: &ToolInvocationState) -> Result<GenerationRequest>;

    /// Turns the raw service output into the tool's result.
    fn normalize_output(&self, output: GenerationOutput) -> Result<GenerationOutput> {
        Ok(output)
    }

    /// User-facing message for a failed invocation.
    fn failure_message(&self, error: &MarketError) -> String {
        match error {
            MarketError::Credential(message) => message.clone(),
            MarketError::PollingTimeout { attempts } => format!(
                "A operação não foi concluída após {attempts} verificações. Tente novamente."
            ),
            _ => self.generic_failure().to_string(),
        }
    }

    /// Called after a field was stored, to keep dependent fields consistent.
    fn field_edited(&self, _state: &mut ToolInvocationState, _name: &str) {}

    /// Fixed file name for downloading a media result.
    fn download_filename(&self) -> Option<&'static str> {
        None
    }

    /// Whether submit requires an explicitly selected credential.
    fn requires_credential(&self) -> bool {
        false
    }

    /// Messages cycled through while a long-running operation is polled.
    fn progress_messages(&self) -> &'static [&'static str] {
        &[]
    }
}

/// All implemented tools, configured with `models`.
pub fn builtin_handlers(
    models: &ModelConfig,
    prompts: Arc<PromptTemplates>,
) -> Vec<Arc<dyn ToolHandler>> {
    vec![
        Arc::new(NotificationHandler::new(&models.text, prompts.clone())),
        Arc::new(MarketingContentHandler::new(&models.pro, prompts.clone())),
        Arc::new(VisualVariationsHandler::new(&models.image)),
        Arc::new(BackgroundRemoverHandler::new(&models.image)),
        Arc::new(Mockup3dHandler::new(&models.video)),
        Arc::new(PixReceiptHandler::new(&models.text, prompts)),
    ]
}

/// The attachment of image field `name`, or the tool's validation error.
fn required_image(
    state: &ToolInvocationState,
    name: &str,
    message: &'static str,
) -> Result<market_core::generation::Attachment> {
    state
        .file(name)
        .map(Into::into)
        .ok_or_else(|| MarketError::validation(message))
}
