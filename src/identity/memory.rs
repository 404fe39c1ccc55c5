//! In-memory identity backend. Backs the test suite and small embedded
//! deployments; mirrors the set-like semantics of memberships and grants.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use super::backend::{BackendError, IdentityBackend, RoleRecord, TenantRecord, UserRecord};

#[derive(Default)]
struct Inner {
    users: Vec<UserRecord>,
    tenants: Vec<TenantRecord>,
    roles: Vec<RoleRecord>,
    // user_id -> tenant_ids
    memberships: HashMap<String, HashSet<String>>,
    // (user_id, tenant_id) -> role_ids
    grants: HashMap<(String, String), HashSet<String>>,
}

#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tenant; test/setup helper, not part of the provisioning path.
    pub fn add_tenant(&self, tenant: TenantRecord) {
        self.inner.write().tenants.push(tenant);
    }

    pub fn user_count(&self) -> usize {
        self.inner.read().users.len()
    }

    pub fn role_count(&self) -> usize {
        self.inner.read().roles.len()
    }

    pub fn membership_count(&self) -> usize {
        self.inner.read().memberships.values().map(|t| t.len()).sum()
    }

    pub fn grant_count(&self) -> usize {
        self.inner.read().grants.values().map(|r| r.len()).sum()
    }
}

impl IdentityBackend for MemoryBackend {
    fn get_user_by_name(
        &self,
        name: &str,
        domain_id: &str,
    ) -> Result<Option<UserRecord>, BackendError> {
        let inner = self.inner.read();
        Ok(inner.users.iter().find(|u| u.name == name && u.domain_id == domain_id).cloned())
    }

    fn create_user(&self, user: &UserRecord) -> Result<(), BackendError> {
        let mut inner = self.inner.write();
        if inner.users.iter().any(|u| u.id == user.id || (u.name == user.name && u.domain_id == user.domain_id)) {
            return Err(BackendError::AlreadyExists);
        }
        inner.users.push(user.clone());
        Ok(())
    }

    fn get_tenant_by_name(
        &self,
        name: &str,
        domain_id: &str,
    ) -> Result<Option<TenantRecord>, BackendError> {
        let inner = self.inner.read();
        Ok(inner.tenants.iter().find(|t| t.name == name && t.domain_id == domain_id).cloned())
    }

    fn tenants_for_user(&self, user_id: &str) -> Result<Vec<TenantRecord>, BackendError> {
        let inner = self.inner.read();
        let Some(tenant_ids) = inner.memberships.get(user_id) else {
            return Ok(Vec::new());
        };
        Ok(inner.tenants.iter().filter(|t| tenant_ids.contains(&t.id)).cloned().collect())
    }

    fn add_user_to_tenant(&self, user_id: &str, tenant_id: &str) -> Result<(), BackendError> {
        let mut inner = self.inner.write();
        let members = inner.memberships.entry(user_id.to_string()).or_default();
        if !members.insert(tenant_id.to_string()) {
            return Err(BackendError::AlreadyExists);
        }
        Ok(())
    }

    fn list_roles(&self) -> Result<Vec<RoleRecord>, BackendError> {
        Ok(self.inner.read().roles.clone())
    }

    fn create_role(&self, role: &RoleRecord) -> Result<(), BackendError> {
        let mut inner = self.inner.write();
        if inner.roles.iter().any(|r| r.id == role.id || r.name == role.name) {
            return Err(BackendError::AlreadyExists);
        }
        inner.roles.push(role.clone());
        Ok(())
    }

    fn roles_for_user_on_tenant(
        &self,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<Vec<RoleRecord>, BackendError> {
        let inner = self.inner.read();
        let Some(role_ids) = inner.grants.get(&(user_id.to_string(), tenant_id.to_string())) else {
            return Ok(Vec::new());
        };
        Ok(inner.roles.iter().filter(|r| role_ids.contains(&r.id)).cloned().collect())
    }

    fn add_role_to_user_on_tenant(
        &self,
        user_id: &str,
        tenant_id: &str,
        role_id: &str,
    ) -> Result<(), BackendError> {
        let mut inner = self.inner.write();
        let granted =
            inner.grants.entry((user_id.to_string(), tenant_id.to_string())).or_default();
        if !granted.insert(role_id.to_string()) {
            return Err(BackendError::AlreadyExists);
        }
        Ok(())
    }
}
