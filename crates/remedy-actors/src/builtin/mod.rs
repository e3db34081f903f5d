//! Built-in actors.
//!
//! Each actor targets one backend's request shape. They are ordinary
//! values; hosts register whichever subset they deploy with.

mod appc;
mod so;
mod vfc;

pub use appc::AppcActor;
pub use so::SoActor;
pub use vfc::VfcActor;
