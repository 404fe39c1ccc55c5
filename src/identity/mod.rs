//! Identity backend collaborator surface and the provisioning engine built
//! on top of it. Keep the public surface thin and split implementation
//! across sub-modules.

mod backend;
mod memory;
mod provision;

pub use backend::{BackendError, IdentityBackend, RoleRecord, TenantRecord, UserRecord};
pub use memory::MemoryBackend;
pub use provision::{ProvisioningEngine, ProvisioningPolicy};
