//! Shared types for the remedy control-loop engine.
//!
//! These are the values that cross crate boundaries: identifiers, the
//! inbound fault event, the operation outcome enum, and the backend
//! request handed to the transport.

mod event;
mod ids;
mod outcome;
mod request;

pub use event::OnsetEvent;
pub use ids::{RequestId, TransactionId};
pub use outcome::Outcome;
pub use request::BackendRequest;
