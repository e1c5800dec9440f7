//! Per-tool invocation state.
//!
//! Every opened tool owns one [`ToolInvocationState`]. The lifecycle
//! controller drives it through [`InvocationPhase`]:
//!
//! ```text
//! Idle -> Validating -> InFlight [-> Polling] -> Succeeded | Failed -> Idle
//! ```
//!
//! `result` and `error_message` are never set at the same time.

mod field;
mod policy;
mod state;

pub use field::{ACCEPTED_IMAGE_TYPES, FieldKind, FieldSpec, FieldValue, InputFile};
pub use policy::PollPolicy;
pub use state::{CredentialStatus, InvocationPhase, ToolInvocationState};
