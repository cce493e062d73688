//! Capability traits for the directory service.
//!
//! Each trait covers one narrow concern so the reconciler can be driven by the
//! HTTP client in production and by in-memory fakes in tests.

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::models::{ClientRecord, Device, Group};

/// Read access to the directory's device table.
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// List known devices in directory order.
    async fn list_devices(&self) -> DirectoryResult<Vec<Device>>;
}

/// Read/write access to per-client policy records.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// List every client record.
    async fn list_client_records(&self) -> DirectoryResult<Vec<ClientRecord>>;

    /// Replace the full group set of the client keyed by `hardware_address`.
    async fn assign_groups(&self, hardware_address: &str, group_ids: &[u32])
        -> DirectoryResult<()>;
}

/// Group lifecycle on the directory.
#[async_trait]
pub trait GroupProvisioner: Send + Sync {
    /// Look up a group by name. `Ok(None)` when it does not exist.
    async fn find_group(&self, name: &str) -> DirectoryResult<Option<Group>>;

    /// Create an enabled group and return the identifier the directory assigned.
    async fn create_group(&self, name: &str, comment: &str) -> DirectoryResult<u32>;

    /// Delete a group by name.
    async fn delete_group(&self, name: &str) -> DirectoryResult<()>;
}
