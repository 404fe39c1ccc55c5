//! Idempotent provisioning of users, tenant memberships and role grants.
//! Every step is safe to repeat for the same principal across independent
//! requests; memberships and grants are set-like, never counted.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use super::backend::{BackendError, IdentityBackend, RoleRecord, TenantRecord, UserRecord};
use crate::auth::ResolvedIdentity;
use crate::error::AuthError;

/// What provisioning is allowed to create. `add_roles` only takes effect on
/// the autocreate path that also creates the tenant membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningPolicy {
    pub autocreate_users: bool,
    pub add_roles: bool,
    pub default_role_names: Vec<String>,
}

impl Default for ProvisioningPolicy {
    fn default() -> Self {
        Self {
            autocreate_users: false,
            add_roles: false,
            default_role_names: vec!["_member_".to_string()],
        }
    }
}

/// Brings the identity backend in line with a resolved identity: user record,
/// tenant membership and, optionally, default role grants.
pub struct ProvisioningEngine {
    backend: Arc<dyn IdentityBackend>,
    policy: ProvisioningPolicy,
    domain_id: String,
}

impl ProvisioningEngine {
    pub fn new(
        backend: Arc<dyn IdentityBackend>,
        policy: ProvisioningPolicy,
        domain_id: impl Into<String>,
    ) -> Self {
        Self { backend, policy, domain_id: domain_id.into() }
    }

    /// Ensure backend state for `principal` mapped onto `resolved_tenant`.
    ///
    /// `requested_tenant` is the tenant the caller explicitly asked for, if
    /// any; a principal is never silently redirected to a tenant it did not
    /// request. Backend failures abort at the failing step; already-completed
    /// idempotent steps are safe to leave as-is.
    pub fn ensure(
        &self,
        principal: &str,
        resolved_tenant: &str,
        requested_tenant: Option<&str>,
    ) -> Result<ResolvedIdentity, AuthError> {
        let user = self.get_or_create_user(principal)?;

        let tenant = self
            .backend
            .get_tenant_by_name(resolved_tenant, &self.domain_id)?
            .ok_or_else(|| AuthError::TenantNotFound(resolved_tenant.to_string()))?;

        if let Some(requested) = requested_tenant {
            if requested != tenant.name {
                return Err(AuthError::TenantMismatch {
                    requested: requested.to_string(),
                    resolved: tenant.name,
                });
            }
        }

        if self.policy.autocreate_users {
            self.ensure_membership(&user, &tenant)?;
            if self.policy.add_roles {
                self.ensure_default_roles(&user, &tenant)?;
            }
        }

        Ok(ResolvedIdentity { principal: user.name, tenant: tenant.name })
    }

    fn get_or_create_user(&self, name: &str) -> Result<UserRecord, AuthError> {
        if let Some(user) = self.backend.get_user_by_name(name, &self.domain_id)? {
            return Ok(user);
        }
        if !self.policy.autocreate_users {
            debug!(user = %name, "remote user not found");
            return Err(AuthError::PrincipalNotFound(name.to_string()));
        }
        let user = UserRecord {
            id: fresh_id(),
            name: name.to_string(),
            enabled: true,
            domain_id: self.domain_id.clone(),
        };
        info!(user = %user.name, id = %user.id, "autocreating remote user");
        match self.backend.create_user(&user) {
            Ok(()) => Ok(user),
            // A concurrent first-sight request won the create; use its record.
            Err(BackendError::AlreadyExists) => {
                Ok(self.backend.get_user_by_name(name, &self.domain_id)?.unwrap_or(user))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn ensure_membership(
        &self,
        user: &UserRecord,
        tenant: &TenantRecord,
    ) -> Result<(), AuthError> {
        // Keyed by tenant id: backend records need not be structurally
        // identical across calls.
        let tenants = self.backend.tenants_for_user(&user.id)?;
        if tenants.iter().any(|t| t.id == tenant.id) {
            return Ok(());
        }
        info!(user = %user.id, tenant = %tenant.id, "automatically adding user to tenant");
        match self.backend.add_user_to_tenant(&user.id, &tenant.id) {
            Ok(()) | Err(BackendError::AlreadyExists) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn ensure_default_roles(
        &self,
        user: &UserRecord,
        tenant: &TenantRecord,
    ) -> Result<(), AuthError> {
        let held = self.backend.roles_for_user_on_tenant(&user.id, &tenant.id)?;
        for role_name in &self.policy.default_role_names {
            if held.iter().any(|r| &r.name == role_name) {
                continue;
            }
            let role = self.get_or_create_role(role_name)?;
            debug!(role = %role.name, user = %user.id, "adding role to user");
            match self.backend.add_role_to_user_on_tenant(&user.id, &tenant.id, &role.id) {
                Ok(()) | Err(BackendError::AlreadyExists) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn get_or_create_role(&self, name: &str) -> Result<RoleRecord, AuthError> {
        if let Some(role) = self.find_role(name)? {
            return Ok(role);
        }
        let role = RoleRecord { id: fresh_id(), name: name.to_string() };
        info!(role = %role.name, "role not found, autocreating");
        match self.backend.create_role(&role) {
            Ok(()) => Ok(role),
            Err(BackendError::AlreadyExists) => Ok(self.find_role(name)?.unwrap_or(role)),
            Err(e) => Err(e.into()),
        }
    }

    fn find_role(&self, name: &str) -> Result<Option<RoleRecord>, BackendError> {
        Ok(self.backend.list_roles()?.into_iter().find(|r| r.name == name))
    }
}

fn fresh_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryBackend;

    const DN: &str = "/DC=org/DC=example/CN=someone";

    fn backend_with_tenant(name: &str) -> Arc<MemoryBackend> {
        let b = Arc::new(MemoryBackend::new());
        b.add_tenant(TenantRecord {
            id: format!("{name}-id"),
            name: name.to_string(),
            domain_id: "default".to_string(),
        });
        b
    }

    fn engine(backend: Arc<MemoryBackend>, policy: ProvisioningPolicy) -> ProvisioningEngine {
        ProvisioningEngine::new(backend, policy, "default")
    }

    #[test]
    fn unknown_user_without_autocreate_fails_and_mutates_nothing() {
        let backend = backend_with_tenant("dteam-tenant");
        let e = engine(backend.clone(), ProvisioningPolicy::default());
        match e.ensure(DN, "dteam-tenant", None).unwrap_err() {
            AuthError::PrincipalNotFound(name) => assert_eq!(name, DN),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(backend.user_count(), 0);
        assert_eq!(backend.membership_count(), 0);
    }

    #[test]
    fn autocreate_provisions_user_membership_role_and_grant() {
        let backend = backend_with_tenant("dteam-tenant");
        let e = engine(
            backend.clone(),
            ProvisioningPolicy {
                autocreate_users: true,
                add_roles: true,
                default_role_names: vec!["member".into()],
            },
        );
        let identity = e.ensure(DN, "dteam-tenant", None).unwrap();
        assert_eq!(identity.principal, DN);
        assert_eq!(identity.tenant, "dteam-tenant");
        assert_eq!(backend.user_count(), 1);
        assert_eq!(backend.membership_count(), 1);
        assert_eq!(backend.role_count(), 1);
        assert_eq!(backend.grant_count(), 1);

        let user = backend.get_user_by_name(DN, "default").unwrap().unwrap();
        assert!(user.enabled);
        assert_eq!(user.domain_id, "default");
        let roles = backend.roles_for_user_on_tenant(&user.id, "dteam-tenant-id").unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "member");
    }

    #[test]
    fn ensure_is_idempotent() {
        let backend = backend_with_tenant("dteam-tenant");
        let e = engine(
            backend.clone(),
            ProvisioningPolicy {
                autocreate_users: true,
                add_roles: true,
                default_role_names: vec!["member".into()],
            },
        );
        e.ensure(DN, "dteam-tenant", None).unwrap();
        let first = (
            backend.user_count(),
            backend.membership_count(),
            backend.role_count(),
            backend.grant_count(),
        );
        e.ensure(DN, "dteam-tenant", None).unwrap();
        let second = (
            backend.user_count(),
            backend.membership_count(),
            backend.role_count(),
            backend.grant_count(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn missing_backend_tenant_is_unauthorized() {
        let backend = Arc::new(MemoryBackend::new());
        let e = engine(
            backend,
            ProvisioningPolicy { autocreate_users: true, ..ProvisioningPolicy::default() },
        );
        match e.ensure(DN, "dteam-tenant", None).unwrap_err() {
            AuthError::TenantNotFound(name) => {
                assert_eq!(name, "dteam-tenant");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn requested_tenant_mismatch_is_rejected_before_provisioning() {
        let backend = backend_with_tenant("dteam-tenant");
        let e = engine(
            backend.clone(),
            ProvisioningPolicy { autocreate_users: true, ..ProvisioningPolicy::default() },
        );
        match e.ensure(DN, "dteam-tenant", Some("other-tenant")).unwrap_err() {
            AuthError::TenantMismatch { requested, resolved } => {
                assert_eq!(requested, "other-tenant");
                assert_eq!(resolved, "dteam-tenant");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(backend.membership_count(), 0);
    }

    #[test]
    fn matching_requested_tenant_is_accepted() {
        let backend = backend_with_tenant("dteam-tenant");
        let e = engine(
            backend,
            ProvisioningPolicy { autocreate_users: true, ..ProvisioningPolicy::default() },
        );
        let identity = e.ensure(DN, "dteam-tenant", Some("dteam-tenant")).unwrap();
        assert_eq!(identity.tenant, "dteam-tenant");
    }

    #[test]
    fn existing_user_without_autocreate_resolves_but_adds_nothing() {
        let backend = backend_with_tenant("dteam-tenant");
        backend
            .create_user(&UserRecord {
                id: "u1".into(),
                name: DN.into(),
                enabled: true,
                domain_id: "default".into(),
            })
            .unwrap();
        let e = engine(backend.clone(), ProvisioningPolicy::default());
        let identity = e.ensure(DN, "dteam-tenant", None).unwrap();
        assert_eq!(identity.principal, DN);
        assert_eq!(backend.membership_count(), 0);
    }

    #[test]
    fn preexisting_role_is_granted_not_recreated() {
        let backend = backend_with_tenant("dteam-tenant");
        backend.create_role(&RoleRecord { id: "r1".into(), name: "member".into() }).unwrap();
        let e = engine(
            backend.clone(),
            ProvisioningPolicy {
                autocreate_users: true,
                add_roles: true,
                default_role_names: vec!["member".into()],
            },
        );
        e.ensure(DN, "dteam-tenant", None).unwrap();
        assert_eq!(backend.role_count(), 1);
        assert_eq!(backend.grant_count(), 1);
    }
}
