//! Generation request/response types and the service boundary.
//!
//! A [`GenerationRequest`] is built fresh per invocation and handed to a
//! [`GenerationService`]. The service answers either with a finished
//! [`GenerationOutput`] or with a [`GenerationOperation`] handle that has to be
//! polled until it is done (video generation).

mod request;
mod response;
mod service;

pub use request::{
    Attachment, GenerationRequest, ResponseModality, ResponseSchema, SchemaProperty, VideoConfig,
};
pub use response::{GenerationOperation, GenerationOutput, GenerationResponse, MediaAsset};
pub use service::GenerationService;
