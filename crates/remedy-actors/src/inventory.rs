//! Inventory collaborator seam.

use async_trait::async_trait;

use crate::error::Result;

/// A resolved inventory record for a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    /// Canonical resource id.
    pub id: String,
    /// Resource name, when known.
    pub name: Option<String>,
    /// Owning service instance id, when known.
    pub service_instance_id: Option<String>,
}

/// External inventory lookup used by builders that must resolve an
/// instance id from a partial event.
///
/// Both lookups are fallible and optional: `Ok(None)` means the
/// resource is simply not known, `Err` means the collaborator itself
/// failed. Builders treat either as "cannot build request".
#[async_trait]
pub trait Inventory: Send + Sync {
    /// Resolve a record by resource name.
    async fn query_by_name(&self, name: &str) -> Result<Option<InventoryRecord>>;

    /// Resolve a record by resource id.
    async fn query_by_id(&self, id: &str) -> Result<Option<InventoryRecord>>;
}
