//! Contract wrapper around the native VOMS validation library.

use parking_lot::Mutex;

use crate::attributes::{CertificateChain, VomsAttributes};
use crate::error::{AuthError, VomsError};

/// Trust material handed to the native validator on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustConfig {
    pub vomsdir_path: String,
    pub ca_path: String,
    pub vomsapi_lib: String,
    /// Skip signature verification. Development only.
    pub no_verify: bool,
}

/// Native validation collaborator.
///
/// One call per authentication attempt. Any native handle or context must be
/// acquired and released inside `retrieve`, on every exit path, so that no
/// state outlives the call and independent requests can reuse the
/// implementation safely.
pub trait VomsApi: Send + Sync {
    /// Validate the chain and return the attributes carried by its VOMS
    /// extension, or the native error code on failure.
    fn retrieve(
        &self,
        chain: &CertificateChain,
        trust: &TrustConfig,
    ) -> Result<VomsAttributes, i32>;
}

/// Thin wrapper that serializes calls into the native layer and maps its
/// numeric error codes onto the typed taxonomy.
pub struct AttributeValidator {
    api: Box<dyn VomsApi>,
    trust: TrustConfig,
    // The native library is not assumed thread-safe; one call at a time.
    native_lock: Mutex<()>,
}

impl AttributeValidator {
    pub fn new(api: Box<dyn VomsApi>, trust: TrustConfig) -> Self {
        Self { api, trust, native_lock: Mutex::new(()) }
    }

    pub fn trust(&self) -> &TrustConfig {
        &self.trust
    }

    pub fn validate(&self, chain: &CertificateChain) -> Result<VomsAttributes, AuthError> {
        let _guard = self.native_lock.lock();
        self.api
            .retrieve(chain, &self.trust)
            .map_err(|code| AuthError::Validation(VomsError::from_code(code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Severity, VomsErrorKind};

    struct FixedApi(Result<VomsAttributes, i32>);

    impl VomsApi for FixedApi {
        fn retrieve(
            &self,
            _chain: &CertificateChain,
            _trust: &TrustConfig,
        ) -> Result<VomsAttributes, i32> {
            self.0.clone()
        }
    }

    fn chain() -> CertificateChain {
        CertificateChain::new(b"EE".to_vec(), vec![])
    }

    #[test]
    fn success_passes_attributes_through() {
        let attrs = VomsAttributes {
            user: "/DC=org/CN=someone".into(),
            voname: "dteam".into(),
            fqans: vec!["/dteam/Role=NULL/Capability=NULL".into()],
            ..Default::default()
        };
        let v = AttributeValidator::new(Box::new(FixedApi(Ok(attrs.clone()))), TrustConfig::default());
        let got = v.validate(&chain()).unwrap();
        assert_eq!(got, attrs);
    }

    #[test]
    fn native_codes_map_to_typed_errors() {
        let v = AttributeValidator::new(Box::new(FixedApi(Err(5))), TrustConfig::default());
        match v.validate(&chain()).unwrap_err() {
            AuthError::Validation(e) => {
                assert_eq!(e.kind, VomsErrorKind::NoExt);
                assert_eq!(e.severity(), Severity::BadRequest);
            }
            other => panic!("unexpected error: {other}"),
        }

        let v = AttributeValidator::new(Box::new(FixedApi(Err(42))), TrustConfig::default());
        match v.validate(&chain()).unwrap_err() {
            AuthError::Validation(e) => assert_eq!(e.kind, VomsErrorKind::Unknown),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validator_is_reusable_across_requests() {
        let v = AttributeValidator::new(
            Box::new(FixedApi(Ok(VomsAttributes::default()))),
            TrustConfig::default(),
        );
        assert!(v.validate(&chain()).is_ok());
        assert!(v.validate(&chain()).is_ok());
    }
}
