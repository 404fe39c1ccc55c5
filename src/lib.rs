//! VOMS attribute-certificate authentication for multi-tenant services.
//!
//! A principal presents an X.509 chain carrying a VOMS extension (a proof of
//! virtual-organization membership). A native validation collaborator turns
//! the chain into structured attributes; the FQANs are matched against an
//! administrator-supplied policy table to pick a tenant; and an idempotent
//! provisioning engine brings the identity backend in line (user record,
//! tenant membership, default role grants) on first sight of the principal.
//!
//! Delivery of the certificate material, response rendering and the identity
//! backend's storage are the host's concern; this crate only emits `tracing`
//! events and returns typed results.

pub mod attributes;
pub mod auth;
pub mod config;
pub mod error;
pub mod fqan;
pub mod identity;
pub mod policy;
pub mod resolver;
pub mod validator;

pub use attributes::{CertificateChain, VomsAttributes};
pub use auth::{AuthRequest, Authenticator, ResolvedIdentity};
pub use config::VomsConfig;
pub use error::{AuthError, ConfigError, Severity, VomsError, VomsErrorKind};
pub use fqan::{parse_fqan, Fqan};
pub use identity::{
    BackendError, IdentityBackend, MemoryBackend, ProvisioningEngine, ProvisioningPolicy,
    RoleRecord, TenantRecord, UserRecord,
};
pub use policy::{PolicyEntry, PolicyHandle, PolicyTable};
pub use resolver::resolve_tenant;
pub use validator::{AttributeValidator, TrustConfig, VomsApi};
