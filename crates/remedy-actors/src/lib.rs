//! Actor capability registry and request builders.
//!
//! An actor is a pluggable backend integration capable of executing
//! named recipes against named target types. Actors are values
//! implementing the [`Actor`] trait, registered at process start into
//! an [`ActorRegistry`] injected wherever dispatch happens — there is
//! no reflection and no ambient global catalog.
//!
//! Builders translate an (event, policy) pair into a backend-specific
//! [`BackendRequest`](remedy_types::BackendRequest). An unsupported
//! recipe yields `Ok(None)`: non-actionable, not an error.

mod actor;
mod builtin;
mod error;
mod inventory;
mod registry;

pub use actor::{Actor, ActorContext};
pub use builtin::{AppcActor, SoActor, VfcActor};
pub use error::{ActorError, Result};
pub use inventory::{Inventory, InventoryRecord};
pub use registry::ActorRegistry;
