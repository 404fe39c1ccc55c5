//! Identity-backend collaborator: the store of users, tenants, memberships
//! and role grants that provisioning reads and mutates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub domain_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TenantRecord {
    pub id: String,
    pub name: String,
    pub domain_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRecord {
    pub id: String,
    pub name: String,
}

/// Failure reported by the backend. `AlreadyExists` marks the benign
/// check-then-create race two concurrent first-sight requests can hit;
/// provisioning treats it as success. Everything else is surfaced unchanged.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("record already exists")]
    AlreadyExists,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Abstract identity backend. Implementations are shared across concurrent
/// authentication attempts; individual calls carry no pipeline state.
pub trait IdentityBackend: Send + Sync {
    fn get_user_by_name(
        &self,
        name: &str,
        domain_id: &str,
    ) -> Result<Option<UserRecord>, BackendError>;

    fn create_user(&self, user: &UserRecord) -> Result<(), BackendError>;

    fn get_tenant_by_name(
        &self,
        name: &str,
        domain_id: &str,
    ) -> Result<Option<TenantRecord>, BackendError>;

    /// Tenants the user holds a membership in.
    fn tenants_for_user(&self, user_id: &str) -> Result<Vec<TenantRecord>, BackendError>;

    fn add_user_to_tenant(&self, user_id: &str, tenant_id: &str) -> Result<(), BackendError>;

    fn list_roles(&self) -> Result<Vec<RoleRecord>, BackendError>;

    fn create_role(&self, role: &RoleRecord) -> Result<(), BackendError>;

    /// Roles granted to the user on the given tenant.
    fn roles_for_user_on_tenant(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<Vec<RoleRecord>, BackendError>;

    fn add_role_to_user_on_tenant(
        &self,
        user_id: &str,
        tenant_id: &str,
        role_id: &str,
    ) -> Result<(), BackendError>;
}
