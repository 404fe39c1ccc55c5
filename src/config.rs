//! Process configuration for the VOMS authentication layer.

use serde::{Deserialize, Serialize};

use crate::identity::ProvisioningPolicy;
use crate::validator::TrustConfig;

/// Option group controlling trust material, policy location and provisioning.
/// Defaults mirror a standard grid deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VomsConfig {
    /// JSON file containing the VOMS mapping.
    pub voms_policy: String,
    /// Path where VOMS LSC configurations are stored (vomsdir path).
    pub vomsdir_path: String,
    /// Path where CA certificates and CRLs are stored.
    pub ca_path: String,
    /// Native VOMS library to load.
    pub vomsapi_lib: String,
    /// Create users missing from the identity backend and add them to the
    /// mapped tenant automatically.
    pub autocreate_users: bool,
    /// Grant the roles in `user_roles` when creating users.
    pub add_roles: bool,
    /// Roles to add to new users.
    pub user_roles: Vec<String>,
    /// Administrative domain users, tenants and roles live under.
    pub domain: String,
    /// Skip native signature verification. Development only.
    pub no_verify: bool,
}

impl Default for VomsConfig {
    fn default() -> Self {
        Self {
            voms_policy: "/etc/vomsauth/voms.json".to_string(),
            vomsdir_path: "/etc/grid-security/vomsdir/".to_string(),
            ca_path: "/etc/grid-security/certificates/".to_string(),
            vomsapi_lib: "libvomsapi.so.1".to_string(),
            autocreate_users: false,
            add_roles: false,
            user_roles: vec!["_member_".to_string()],
            domain: "default".to_string(),
            no_verify: false,
        }
    }
}

impl VomsConfig {
    pub fn trust_config(&self) -> TrustConfig {
        TrustConfig {
            vomsdir_path: self.vomsdir_path.clone(),
            ca_path: self.ca_path.clone(),
            vomsapi_lib: self.vomsapi_lib.clone(),
            no_verify: self.no_verify,
        }
    }

    pub fn provisioning_policy(&self) -> ProvisioningPolicy {
        ProvisioningPolicy {
            autocreate_users: self.autocreate_users,
            add_roles: self.add_roles,
            default_role_names: self.user_roles.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_grid_deployment() {
        let cfg = VomsConfig::default();
        assert_eq!(cfg.voms_policy, "/etc/vomsauth/voms.json");
        assert_eq!(cfg.vomsdir_path, "/etc/grid-security/vomsdir/");
        assert_eq!(cfg.ca_path, "/etc/grid-security/certificates/");
        assert_eq!(cfg.vomsapi_lib, "libvomsapi.so.1");
        assert!(!cfg.autocreate_users);
        assert!(!cfg.add_roles);
        assert_eq!(cfg.user_roles, vec!["_member_".to_string()]);
        assert!(!cfg.no_verify);
    }

    #[test]
    fn partial_json_overlays_defaults() {
        let cfg: VomsConfig =
            serde_json::from_str(r#"{"autocreate_users": true, "user_roles": ["member"]}"#)
                .unwrap();
        assert!(cfg.autocreate_users);
        assert_eq!(cfg.user_roles, vec!["member".to_string()]);
        assert_eq!(cfg.vomsapi_lib, "libvomsapi.so.1");
        let policy = cfg.provisioning_policy();
        assert!(policy.autocreate_users && !policy.add_roles);
    }
}
