//! Invocation state of one opened tool.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::field::{FieldSpec, FieldValue, InputFile};
use crate::generation::GenerationOutput;

/// Lifecycle phase of a tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum InvocationPhase {
    /// Waiting for input (initial state).
    Idle,
    /// Checking required fields.
    Validating,
    /// The request has been issued.
    InFlight,
    /// Waiting on a long-running operation; `attempt` status fetches so far.
    Polling { attempt: u32 },
    Succeeded,
    Failed,
}

impl InvocationPhase {
    /// A request is outstanding.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::InFlight | Self::Polling { .. })
    }

    /// Submit is not allowed in this phase.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Validating | Self::InFlight | Self::Polling { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Whether an API credential is available to the tool.
///
/// Injected by the host when the tool is opened; a credential error while
/// polling turns it into `Invalidated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CredentialStatus {
    Selected,
    #[default]
    Missing,
    Invalidated,
}

impl CredentialStatus {
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected)
    }
}

/// Mutable state of one opened tool. Discarded when the tool is closed.
#[derive(Debug, Clone)]
pub struct ToolInvocationState {
    pub id: Uuid,
    pub tool_key: String,
    fields: BTreeMap<String, FieldValue>,
    phase: InvocationPhase,
    error_message: Option<String>,
    result: Option<GenerationOutput>,
    copied: bool,
    credential: CredentialStatus,
    started_at: Option<DateTime<Utc>>,
}

impl ToolInvocationState {
    pub fn new(tool_key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool_key: tool_key.into(),
            fields: BTreeMap::new(),
            phase: InvocationPhase::Idle,
            error_message: None,
            result: None,
            copied: false,
            credential: CredentialStatus::default(),
            started_at: None,
        }
    }

    /// Pre-fills the declared defaults of `specs`.
    pub fn with_defaults(mut self, specs: &[FieldSpec]) -> Self {
        for spec in specs {
            if let Some(default) = &spec.default {
                self.fields
                    .insert(spec.name.clone(), FieldValue::Text(default.clone()));
            }
        }
        self
    }

    pub fn with_credential(mut self, credential: CredentialStatus) -> Self {
        self.credential = credential;
        self
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn phase(&self) -> InvocationPhase {
        self.phase
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn result(&self) -> Option<&GenerationOutput> {
        self.result.as_ref()
    }

    pub fn copied(&self) -> bool {
        self.copied
    }

    pub fn credential(&self) -> CredentialStatus {
        self.credential
    }

    pub fn needs_credential(&self) -> bool {
        !self.credential.is_selected()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text value of a field; missing or file fields read as "".
    pub fn text(&self, name: &str) -> &str {
        self.fields
            .get(name)
            .and_then(FieldValue::as_text)
            .unwrap_or("")
    }

    pub fn file(&self, name: &str) -> Option<&InputFile> {
        self.fields.get(name).and_then(FieldValue::as_file)
    }

    /// Present and non-blank.
    pub fn has_value(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|value| !value.is_empty())
    }

    pub fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    pub fn can_submit(&self) -> bool {
        !self.phase.is_busy()
    }

    pub fn can_copy(&self) -> bool {
        self.result
            .as_ref()
            .is_some_and(|result| result.copy_text().is_some())
    }

    pub fn can_download(&self) -> bool {
        self.result
            .as_ref()
            .is_some_and(|result| result.media().is_some())
    }

    // ============================================================================
    // Edits
    // ============================================================================

    /// Stores a field value. Editing after a finished run returns to `Idle`.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
        if self.phase.is_terminal() {
            self.reset();
        }
    }

    pub fn clear_field(&mut self, name: &str) {
        self.fields.remove(name);
        if self.phase.is_terminal() {
            self.reset();
        }
    }

    pub fn set_credential(&mut self, credential: CredentialStatus) {
        self.credential = credential;
    }

    pub fn mark_copied(&mut self) {
        self.copied = true;
    }

    // ============================================================================
    // Transitions
    // ============================================================================

    pub fn begin_validation(&mut self) {
        self.phase = InvocationPhase::Validating;
        self.clear_outcome();
    }

    pub fn begin_request(&mut self) {
        self.phase = InvocationPhase::InFlight;
        self.started_at = Some(Utc::now());
        self.clear_outcome();
    }

    pub fn enter_polling(&mut self, attempt: u32) {
        self.phase = InvocationPhase::Polling { attempt };
    }

    pub fn succeed(&mut self, output: GenerationOutput) {
        self.phase = InvocationPhase::Succeeded;
        self.error_message = None;
        self.result = Some(output);
        self.copied = false;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = InvocationPhase::Failed;
        self.result = None;
        self.error_message = Some(message.into());
        self.copied = false;
    }

    /// Back to `Idle`, dropping result and error. Field values are kept.
    pub fn reset(&mut self) {
        self.phase = InvocationPhase::Idle;
        self.started_at = None;
        self.clear_outcome();
    }

    /// Replaces the text fields with values produced by a structured response.
    pub fn merge_text_fields(&mut self, values: &BTreeMap<String, String>) {
        for (name, value) in values {
            self.fields
                .insert(name.clone(), FieldValue::Text(value.clone()));
        }
    }

    fn clear_outcome(&mut self) {
        self.error_message = None;
        self.result = None;
        self.copied = false;
    }
}
