//! Tenant resolution: match validated VOMS attributes against the policy
//! table to pick the tenant a principal is mapped to.

use tracing::warn;

use crate::attributes::VomsAttributes;
use crate::error::AuthError;
use crate::policy::PolicyTable;

/// Pick the tenant for the given attributes.
///
/// FQANs are tried in the order the validator returned them and the first one
/// with a policy entry wins; administrators control precedence through the
/// VOMS server's FQAN ordering, not through the table. When no FQAN matches,
/// the bare VO name is tried. An unmatched VO is an expected administrative
/// case, not an internal error.
pub fn resolve_tenant(attrs: &VomsAttributes, policy: &PolicyTable) -> Result<String, AuthError> {
    let entry = attrs
        .fqans
        .iter()
        .find_map(|fqan| policy.lookup(fqan))
        .or_else(|| policy.lookup(&attrs.voname));
    match entry {
        Some(e) => Ok(e.tenant.clone()),
        None => {
            warn!(vo = %attrs.voname, "VO mapping not properly configured");
            Err(AuthError::VoNotConfigured(attrs.voname.clone()))
        }
    }
}
