//! Core data models for chat messages, capabilities and dispatch results.

mod capability;
mod envelope;
mod message;

pub use capability::{CapabilityDescriptor, CapabilityKind, Params, ProtocolServer, ServerStatus};
pub use envelope::{Outcome, Payload, ResponseEnvelope};
pub use message::{Message, Sender};
