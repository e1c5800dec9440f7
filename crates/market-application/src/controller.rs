//! Request/result lifecycle of one opened tool.
//!
//! The controller is a cloneable handle around the [`ToolInvocationState`] of a
//! single tool instance. All transitions go through it:
//!
//! 1. `submit()` validates the fields, builds the request and calls the
//!    [`GenerationService`]. A second submit while busy is rejected.
//! 2. A pending operation is polled according to the [`PollPolicy`].
//! 3. The outcome is stored as either a result or an error message.
//!
//! `reset()` and `close()` cancel an outstanding request. Every request carries
//! the epoch it was issued in, so an answer that arrives after a reset is
//! dropped instead of being written into the fresh state.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use market_core::clipboard::Clipboard;
use market_core::error::{MarketError, Result};
use market_core::generation::{
    GenerationOperation, GenerationOutput, GenerationRequest, GenerationResponse,
    GenerationService, MediaAsset,
};
use market_core::invocation::{
    CredentialStatus, FieldSpec, FieldValue, InputFile, InvocationPhase, PollPolicy,
    ToolInvocationState,
};
use market_core::tool::ToolDescriptor;
use tokio_util::sync::CancellationToken;

use crate::handler::ToolHandler;

const VIDEO_MIME_TYPE: &str = "video/mp4";

pub const CREDENTIAL_REQUIRED_MESSAGE: &str = "Esta ferramenta utiliza um modelo de geração de vídeo avançado (Veo) que requer que você selecione uma chave de API para habilitar o faturamento.";

pub const NO_VIDEO_RESULT_MESSAGE: &str = "A geração do vídeo não retornou um resultado válido.";

const UNSUPPORTED_IMAGE_MESSAGE: &str = "Formato de imagem não suportado. Use PNG, JPEG ou WEBP.";

/// A media result ready to be saved under its fixed file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: &'static str,
    pub asset: MediaAsset,
}

struct Shared {
    state: ToolInvocationState,
    /// Bumped by every submit and reset.
    epoch: u64,
    cancel: Option<CancellationToken>,
}

/// Drives one tool instance through its request/result lifecycle.
#[derive(Clone)]
pub struct LifecycleController {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
    service: Arc<dyn GenerationService>,
    policy: PollPolicy,
    shared: Arc<RwLock<Shared>>,
}

impl LifecycleController {
    pub fn new(
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
        service: Arc<dyn GenerationService>,
    ) -> Self {
        let state = ToolInvocationState::new(descriptor.key.clone()).with_defaults(&handler.fields());
        Self {
            descriptor,
            handler,
            service,
            policy: PollPolicy::default(),
            shared: Arc::new(RwLock::new(Shared {
                state,
                epoch: 0,
                cancel: None,
            })),
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Injects the credential status of the host.
    pub fn with_credential(self, credential: CredentialStatus) -> Self {
        if let Ok(mut shared) = self.shared.write() {
            shared.state.set_credential(credential);
        }
        self
    }

    // ============================================================================
    // Read access
    // ============================================================================

    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    pub fn key(&self) -> &str {
        &self.descriptor.key
    }

    pub fn fields(&self) -> Vec<FieldSpec> {
        self.handler.fields()
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn requires_credential(&self) -> bool {
        self.handler.requires_credential()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> Result<ToolInvocationState> {
        Ok(self.read()?.state.clone())
    }

    pub fn phase(&self) -> Result<InvocationPhase> {
        Ok(self.read()?.state.phase())
    }

    pub fn can_submit(&self) -> bool {
        self.read().is_ok_and(|shared| shared.state.can_submit())
    }

    /// Progress text for the current polling step, if the tool has any.
    pub fn progress_message(&self) -> Option<&'static str> {
        let messages = self.handler.progress_messages();
        if messages.is_empty() {
            return None;
        }
        match self.read().ok()?.state.phase() {
            InvocationPhase::InFlight => messages.first().copied(),
            InvocationPhase::Polling { attempt } => {
                messages.get(attempt as usize % messages.len()).copied()
            }
            _ => None,
        }
    }

    // ============================================================================
    // Edits
    // ============================================================================

    /// Stores a field value. Editing a finished run returns the tool to `Idle`.
    ///
    /// Image fields only take files of the accepted image types.
    pub fn set_field(&self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        let spec = self.field_spec(name)?;
        if spec.is_image() {
            match &value {
                FieldValue::File(file) if file.is_accepted_image() => {}
                FieldValue::File(file) => {
                    tracing::warn!(tool = %self.key(), field = name, mime_type = %file.mime_type, "Rejected file");
                    return Err(MarketError::validation(UNSUPPORTED_IMAGE_MESSAGE));
                }
                FieldValue::Text(_) => {
                    return Err(MarketError::validation(format!(
                        "field '{name}' expects an image file"
                    )));
                }
            }
        } else if let FieldValue::File(_) = value {
            return Err(MarketError::validation(format!(
                "field '{name}' expects text"
            )));
        }

        let mut shared = self.write()?;
        shared.state.set_field(name, value);
        self.handler.field_edited(&mut shared.state, name);
        Ok(())
    }

    /// Drag-and-drop onto an image field. Anything that is not `image/*` is
    /// ignored and `false` is returned.
    pub fn drop_file(&self, name: &str, file: InputFile) -> Result<bool> {
        let spec = self.field_spec(name)?;
        if !spec.is_image() || !file.is_image() {
            tracing::warn!(tool = %self.key(), field = name, mime_type = %file.mime_type, "Ignored dropped file");
            return Ok(false);
        }

        let mut shared = self.write()?;
        shared.state.set_field(name, file);
        self.handler.field_edited(&mut shared.state, name);
        Ok(true)
    }

    pub fn set_credential(&self, credential: CredentialStatus) -> Result<()> {
        self.write()?.state.set_credential(credential);
        Ok(())
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Validates the form and runs the request to completion.
    ///
    /// Returns the terminal phase. Validation problems end in
    /// [`InvocationPhase::Failed`] without any service call. Errors are
    /// returned only when the submit itself could not proceed: another
    /// request is in flight ([`MarketError::Busy`]) or the request was
    /// cancelled by a reset ([`MarketError::Cancelled`]).
    pub async fn submit(&self) -> Result<InvocationPhase> {
        let (request, epoch, token) = match self.begin_submit()? {
            Some(issued) => issued,
            None => return Ok(InvocationPhase::Failed),
        };

        tracing::info!(
            tool = %self.key(),
            phase = "in_flight",
            model = %request.model,
            modality = %request.modality,
            "Request issued"
        );

        let outcome = tokio::select! {
            _ = token.cancelled() => Err(MarketError::Cancelled),
            result = self.execute(&request, epoch) => result,
        };
        self.finish(epoch, outcome)
    }

    /// Back to `Idle`; cancels an outstanding request. Field values are kept.
    pub fn reset(&self) -> Result<()> {
        let mut shared = self.write()?;
        if let Some(token) = shared.cancel.take() {
            tracing::info!(tool = %self.key(), phase = "cancelled", "Cancelling request");
            token.cancel();
        }
        shared.epoch += 1;
        shared.state.reset();
        Ok(())
    }

    /// Discards the tool instance, cancelling anything outstanding.
    pub fn close(self) -> Result<()> {
        self.reset()
    }

    // ============================================================================
    // Result actions
    // ============================================================================

    /// Copies the text result as plain text.
    ///
    /// Returns `false` without touching the clipboard when there is no text
    /// result.
    pub fn copy_text(&self, clipboard: &dyn Clipboard) -> Result<bool> {
        let text = {
            let shared = self.read()?;
            match shared.state.result().and_then(GenerationOutput::copy_text) {
                Some(text) => text,
                None => return Ok(false),
            }
        };

        clipboard.write_text(&text)?;
        self.write()?.state.mark_copied();
        Ok(true)
    }

    /// The media result and its download name, when there is one.
    pub fn download(&self) -> Result<Option<Download>> {
        let Some(filename) = self.handler.download_filename() else {
            return Ok(None);
        };
        let shared = self.read()?;
        Ok(shared
            .state
            .result()
            .and_then(GenerationOutput::media)
            .map(|asset| Download {
                filename,
                asset: asset.clone(),
            }))
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn read(&self) -> Result<RwLockReadGuard<'_, Shared>> {
        self.shared
            .read()
            .map_err(|e| MarketError::internal(format!("invocation state poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Shared>> {
        self.shared
            .write()
            .map_err(|e| MarketError::internal(format!("invocation state poisoned: {e}")))
    }

    fn field_spec(&self, name: &str) -> Result<FieldSpec> {
        self.handler
            .fields()
            .into_iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| MarketError::not_found("field", format!("{}.{name}", self.key())))
    }

    /// Runs the synchronous part of submit under the lock.
    ///
    /// `None` means the submit ended in `Failed` before any call.
    fn begin_submit(&self) -> Result<Option<(GenerationRequest, u64, CancellationToken)>> {
        let mut shared = self.write()?;
        if shared.state.phase().is_busy() {
            tracing::warn!(tool = %self.key(), "Submit rejected: request already in flight");
            return Err(MarketError::Busy(self.key().to_string()));
        }

        shared.state.begin_validation();
        if let Err(err) = self.handler.validate(&shared.state) {
            let message = match err {
                MarketError::Validation(message) => message,
                other => other.to_string(),
            };
            tracing::warn!(tool = %self.key(), phase = "failed", error = %message, "Validation failed");
            shared.state.fail(message);
            return Ok(None);
        }

        if self.handler.requires_credential() && shared.state.needs_credential() {
            tracing::warn!(tool = %self.key(), phase = "failed", "No credential selected");
            shared.state.fail(CREDENTIAL_REQUIRED_MESSAGE);
            return Ok(None);
        }

        let request = match self.handler.build_request(&shared.state) {
            Ok(request) => request,
            Err(err) => {
                tracing::error!(tool = %self.key(), phase = "failed", error = %err, "Failed to build request");
                let message = self.handler.failure_message(&err);
                shared.state.fail(message);
                return Ok(None);
            }
        };

        shared.state.begin_request();
        shared.epoch += 1;
        let token = CancellationToken::new();
        shared.cancel = Some(token.clone());
        Ok(Some((request, shared.epoch, token)))
    }

    async fn execute(&self, request: &GenerationRequest, epoch: u64) -> Result<GenerationOutput> {
        match self.service.generate(request).await? {
            GenerationResponse::Completed(output) => self.handler.normalize_output(output),
            GenerationResponse::Pending(operation) => self.poll_until_done(operation, epoch).await,
        }
    }

    async fn poll_until_done(
        &self,
        mut operation: GenerationOperation,
        epoch: u64,
    ) -> Result<GenerationOutput> {
        let mut fetches = 0u32;
        self.enter_polling(epoch, fetches)?;

        while !operation.done {
            if !self.policy.allows(fetches + 1) {
                return Err(MarketError::PollingTimeout { attempts: fetches });
            }
            tokio::time::sleep(self.policy.interval).await;

            operation = self.service.poll_operation(&operation).await?;
            fetches += 1;
            self.enter_polling(epoch, fetches)?;
            tracing::debug!(
                tool = %self.key(),
                phase = "polling",
                attempt = fetches,
                operation = %operation.name,
                done = operation.done,
                "Polled operation"
            );
        }

        if let Some(error) = operation.error {
            return Err(MarketError::service(None, error));
        }
        let uri = operation
            .result_uri
            .ok_or_else(|| MarketError::malformed(NO_VIDEO_RESULT_MESSAGE))?;

        let bytes = self.service.fetch_asset(&uri).await?;
        Ok(GenerationOutput::Video(MediaAsset::new(bytes, VIDEO_MIME_TYPE)))
    }

    /// Records the polling progress unless the request was cancelled meanwhile.
    fn enter_polling(&self, epoch: u64, attempt: u32) -> Result<()> {
        let mut shared = self.write()?;
        if shared.epoch != epoch {
            return Err(MarketError::Cancelled);
        }
        shared.state.enter_polling(attempt);
        Ok(())
    }

    fn finish(&self, epoch: u64, outcome: Result<GenerationOutput>) -> Result<InvocationPhase> {
        let mut shared = self.write()?;
        if shared.epoch != epoch || matches!(outcome, Err(MarketError::Cancelled)) {
            tracing::debug!(tool = %self.key(), "Discarding outcome of cancelled request");
            return Err(MarketError::Cancelled);
        }
        shared.cancel = None;

        match outcome {
            Ok(output) => self.on_success(&mut shared.state, output),
            Err(err) => self.on_failure(&mut shared.state, &err),
        }
        Ok(shared.state.phase())
    }

    fn on_success(&self, state: &mut ToolInvocationState, output: GenerationOutput) {
        if let GenerationOutput::Fields(values) = &output {
            state.merge_text_fields(values);
        }
        tracing::info!(
            tool = %self.key(),
            phase = "succeeded",
            kind = output.kind(),
            "Request succeeded"
        );
        state.succeed(output);
    }

    fn on_failure(&self, state: &mut ToolInvocationState, err: &MarketError) {
        tracing::error!(tool = %self.key(), phase = "failed", error = %err, "Request failed");
        if err.is_credential() {
            state.set_credential(CredentialStatus::Invalidated);
        }
        state.fail(self.handler.failure_message(err));
    }
}
