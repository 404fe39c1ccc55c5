//! Error model for the VOMS authentication pipeline.
//! `VomsError` mirrors the native validator's numeric code table; `AuthError`
//! is the typed result handed back to the boundary caller, which is
//! responsible for rendering it (this crate never builds responses itself).

use std::fmt::{Display, Formatter};

use crate::identity::BackendError;

/// User-facing severity class of a native validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    BadRequest,
    Unauthorized,
    Internal,
}

/// Well-known native VOMS error kinds, one per numeric code the library can
/// return, plus `Unknown` for anything outside the documented range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VomsErrorKind {
    None,
    NoSocket,
    NoIdent,
    Comm,
    Param,
    NoExt,
    NoInit,
    Time,
    IdCheck,
    ExtraInfo,
    Format,
    NoData,
    Parse,
    Dir,
    Sign,
    Server,
    Mem,
    Verify,
    Type,
    Order,
    ServerCode,
    NotAvail,
    Unknown,
}

impl VomsErrorKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => VomsErrorKind::None,
            1 => VomsErrorKind::NoSocket,
            2 => VomsErrorKind::NoIdent,
            3 => VomsErrorKind::Comm,
            4 => VomsErrorKind::Param,
            5 => VomsErrorKind::NoExt,
            6 => VomsErrorKind::NoInit,
            7 => VomsErrorKind::Time,
            8 => VomsErrorKind::IdCheck,
            9 => VomsErrorKind::ExtraInfo,
            10 => VomsErrorKind::Format,
            11 => VomsErrorKind::NoData,
            12 => VomsErrorKind::Parse,
            13 => VomsErrorKind::Dir,
            14 => VomsErrorKind::Sign,
            15 => VomsErrorKind::Server,
            16 => VomsErrorKind::Mem,
            17 => VomsErrorKind::Verify,
            18 => VomsErrorKind::Type,
            19 => VomsErrorKind::Order,
            20 => VomsErrorKind::ServerCode,
            21 => VomsErrorKind::NotAvail,
            _ => VomsErrorKind::Unknown,
        }
    }

    /// Short tag matching the native library's naming.
    pub fn label(&self) -> &'static str {
        match self {
            VomsErrorKind::None => "none",
            VomsErrorKind::NoSocket => "nosocket",
            VomsErrorKind::NoIdent => "noident",
            VomsErrorKind::Comm => "comm",
            VomsErrorKind::Param => "param",
            VomsErrorKind::NoExt => "noext",
            VomsErrorKind::NoInit => "noinit",
            VomsErrorKind::Time => "time",
            VomsErrorKind::IdCheck => "idcheck",
            VomsErrorKind::ExtraInfo => "extrainfo",
            VomsErrorKind::Format => "format",
            VomsErrorKind::NoData => "nodata",
            VomsErrorKind::Parse => "parse",
            VomsErrorKind::Dir => "dir",
            VomsErrorKind::Sign => "sign",
            VomsErrorKind::Server => "server",
            VomsErrorKind::Mem => "mem",
            VomsErrorKind::Verify => "verify",
            VomsErrorKind::Type => "type",
            VomsErrorKind::Order => "order",
            VomsErrorKind::ServerCode => "servercode",
            VomsErrorKind::NotAvail => "notavail",
            VomsErrorKind::Unknown => "oops",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            VomsErrorKind::NoExt | VomsErrorKind::NoData => Severity::BadRequest,
            VomsErrorKind::Sign => Severity::Unauthorized,
            _ => Severity::Internal,
        }
    }
}

/// A native validation failure: the raw numeric code plus its decoded kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VomsError {
    pub code: i32,
    pub kind: VomsErrorKind,
}

impl VomsError {
    pub fn from_code(code: i32) -> Self {
        Self { code, kind: VomsErrorKind::from_code(code) }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn message(&self) -> String {
        let msg = match self.kind {
            VomsErrorKind::None => "No error",
            VomsErrorKind::NoSocket => "Socket problem",
            VomsErrorKind::NoIdent => "Cannot identify itself (certificate problem)",
            VomsErrorKind::Comm => "Server problem",
            VomsErrorKind::Param => "Wrong parameters",
            VomsErrorKind::NoExt => "VOMS extension missing",
            VomsErrorKind::NoInit => "Initialization error",
            VomsErrorKind::Time => "Error in time checking",
            VomsErrorKind::IdCheck => "User data in extension different from the real",
            VomsErrorKind::ExtraInfo => "VO name and URI missing",
            VomsErrorKind::Format => "Wrong data format",
            VomsErrorKind::NoData => "Empty extension",
            VomsErrorKind::Parse => "Parse error",
            VomsErrorKind::Dir => "Directory error",
            VomsErrorKind::Sign => "Signature error",
            VomsErrorKind::Server => "Unidentifiable VOMS server",
            VomsErrorKind::Mem => "Memory problems",
            VomsErrorKind::Verify => "Generic verification error",
            VomsErrorKind::Type => "Returned data of unknown type",
            VomsErrorKind::Order => "Ordering different than required",
            VomsErrorKind::ServerCode => "Error from the server",
            VomsErrorKind::NotAvail => "Method not available",
            VomsErrorKind::Unknown => return format!("Unknown error {}", self.code),
        };
        msg.to_string()
    }

    pub fn http_status(&self) -> u16 {
        match self.severity() {
            Severity::BadRequest => 400,
            Severity::Unauthorized => 401,
            Severity::Internal => 500,
        }
    }
}

impl Display for VomsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.code, self.message())
    }
}

impl std::error::Error for VomsError {}

/// Load-time configuration failure. Never produced per-request.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not load VOMS policy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("bad formatted VOMS json data: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },
}

/// Typed failure of one authentication attempt.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("VOMS validation failed: {0}")]
    Validation(#[from] VomsError),

    #[error("malformed SSL data: {0}")]
    MalformedChain(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("remote user '{0}' not found")]
    PrincipalNotFound(String),

    #[error("tenant '{0}' not found; your VO is not authorized")]
    TenantNotFound(String),

    #[error("VO '{0}' is not configured")]
    VoNotConfigured(String),

    #[error("requested tenant '{requested}' does not match mapped tenant '{resolved}'")]
    TenantMismatch { requested: String, resolved: String },

    #[error("identity backend error: {0}")]
    Backend(#[from] BackendError),
}

impl AuthError {
    /// Protocol-level status for the boundary caller. The crate never renders
    /// a response; this is the mapping contract only.
    pub fn http_status(&self) -> u16 {
        match self {
            AuthError::Validation(e) => e.http_status(),
            AuthError::MalformedChain(_) => 400,
            AuthError::Config(_) => 500,
            AuthError::PrincipalNotFound(_) => 404,
            AuthError::TenantNotFound(_)
            | AuthError::VoNotConfigured(_)
            | AuthError::TenantMismatch { .. } => 401,
            AuthError::Backend(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_table_maps_all_known_kinds() {
        let expected = [
            (0, VomsErrorKind::None),
            (1, VomsErrorKind::NoSocket),
            (2, VomsErrorKind::NoIdent),
            (3, VomsErrorKind::Comm),
            (4, VomsErrorKind::Param),
            (5, VomsErrorKind::NoExt),
            (6, VomsErrorKind::NoInit),
            (7, VomsErrorKind::Time),
            (8, VomsErrorKind::IdCheck),
            (9, VomsErrorKind::ExtraInfo),
            (10, VomsErrorKind::Format),
            (11, VomsErrorKind::NoData),
            (12, VomsErrorKind::Parse),
            (13, VomsErrorKind::Dir),
            (14, VomsErrorKind::Sign),
            (15, VomsErrorKind::Server),
            (16, VomsErrorKind::Mem),
            (17, VomsErrorKind::Verify),
            (18, VomsErrorKind::Type),
            (19, VomsErrorKind::Order),
            (20, VomsErrorKind::ServerCode),
            (21, VomsErrorKind::NotAvail),
        ];
        for (code, kind) in expected {
            assert_eq!(VomsError::from_code(code).kind, kind, "code {}", code);
        }
    }

    #[test]
    fn severity_classes() {
        for code in 0..=21 {
            let sev = VomsError::from_code(code).severity();
            match code {
                5 | 11 => assert_eq!(sev, Severity::BadRequest, "code {}", code),
                14 => assert_eq!(sev, Severity::Unauthorized),
                _ => assert_eq!(sev, Severity::Internal, "code {}", code),
            }
        }
    }

    #[test]
    fn out_of_range_codes_are_unknown_internal() {
        for code in [-1, 22, 99, 1000] {
            let e = VomsError::from_code(code);
            assert_eq!(e.kind, VomsErrorKind::Unknown);
            assert_eq!(e.severity(), Severity::Internal);
            assert_eq!(e.message(), format!("Unknown error {}", code));
        }
    }

    #[test]
    fn display_carries_code_and_message() {
        assert_eq!(VomsError::from_code(5).to_string(), "(5, VOMS extension missing)");
        assert_eq!(VomsError::from_code(14).to_string(), "(14, Signature error)");
    }

    #[test]
    fn http_status_mapping() {
        assert_eq!(AuthError::Validation(VomsError::from_code(11)).http_status(), 400);
        assert_eq!(AuthError::Validation(VomsError::from_code(14)).http_status(), 401);
        assert_eq!(AuthError::Validation(VomsError::from_code(17)).http_status(), 500);
        assert_eq!(AuthError::MalformedChain("no cert".into()).http_status(), 400);
        assert_eq!(AuthError::PrincipalNotFound("dn".into()).http_status(), 404);
        assert_eq!(AuthError::VoNotConfigured("dteam".into()).http_status(), 401);
        assert_eq!(
            AuthError::TenantMismatch { requested: "a".into(), resolved: "b".into() }.http_status(),
            401
        );
    }
}
