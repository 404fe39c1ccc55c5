//! Top-level authentication orchestrator: validate, resolve, provision.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attributes::CertificateChain;
use crate::config::VomsConfig;
use crate::error::AuthError;
use crate::identity::{IdentityBackend, ProvisioningEngine};
use crate::policy::{PolicyHandle, PolicyTable};
use crate::resolver::resolve_tenant;
use crate::validator::{AttributeValidator, VomsApi};

/// One authentication attempt's input. Only built for requests that carry
/// certificate material and opted into this authentication mode; anything
/// else never reaches the orchestrator.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// Subject DN as reported by the transport layer; carried for the caller,
    /// the pipeline trusts the DN the native validator extracts.
    pub subject_dn: Option<String>,
    pub chain: CertificateChain,
    /// Tenant the caller explicitly asked for, if any.
    pub requested_tenant: Option<String>,
}

/// The pipeline's output: the only state handed back across the boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub principal: String,
    pub tenant: String,
}

/// Sequences validation, tenant resolution and provisioning. Failures abort
/// the pipeline at the failing stage; provisioning never runs for a request
/// that failed validation or resolution.
pub struct Authenticator {
    validator: AttributeValidator,
    policy: PolicyHandle,
    engine: ProvisioningEngine,
}

impl Authenticator {
    pub fn new(
        validator: AttributeValidator,
        policy: PolicyHandle,
        engine: ProvisioningEngine,
    ) -> Self {
        Self { validator, policy, engine }
    }

    /// Wire an authenticator from configuration plus its two collaborators:
    /// the native validation binding and the identity backend.
    pub fn from_config(
        config: &VomsConfig,
        api: Box<dyn VomsApi>,
        policy: PolicyTable,
        backend: Arc<dyn IdentityBackend>,
    ) -> Self {
        Self {
            validator: AttributeValidator::new(api, config.trust_config()),
            policy: PolicyHandle::new(policy),
            engine: ProvisioningEngine::new(
                backend,
                config.provisioning_policy(),
                config.domain.clone(),
            ),
        }
    }

    pub fn policy(&self) -> &PolicyHandle {
        &self.policy
    }

    /// Load the policy file from disk and swap it in atomically. In-flight
    /// requests keep the snapshot they already hold.
    pub fn reload_policy(&self, path: impl AsRef<Path>) -> Result<(), AuthError> {
        let table = PolicyTable::from_path(path)?;
        self.policy.swap(table);
        Ok(())
    }

    pub fn authenticate(&self, req: &AuthRequest) -> Result<ResolvedIdentity, AuthError> {
        let attrs = self.validator.validate(&req.chain)?;
        debug!(user = %attrs.user, vo = %attrs.voname, fqans = attrs.fqans.len(),
               "VOMS attributes validated");

        let table = self.policy.load();
        let tenant = resolve_tenant(&attrs, &table)?;
        debug!(tenant = %tenant, "tenant resolved");

        self.engine.ensure(&attrs.user, &tenant, req.requested_tenant.as_deref())
    }
}
