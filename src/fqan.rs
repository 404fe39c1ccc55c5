//! FQAN (fully qualified attribute name) parsing.

/// Structured form of an FQAN string such as
/// `/dteam/spain/Role=admin/Capability=NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fqan {
    pub vo_group: String,
    pub role: String,
    pub capability: String,
}

/// Split an FQAN into `(vo/groups, role, capability)`.
///
/// Always consumes exactly the two trailing segments: the last as
/// `Capability=<value>`, the next as `Role=<value>`, taking the text after the
/// final `=` (or the whole segment when no `=` is present). A malformed FQAN
/// produces a wrong split rather than an error; policy lookups key on the raw
/// FQAN string, so the parsed tuple is informational.
pub fn parse_fqan(fqan: &str) -> Fqan {
    let mut parts: Vec<&str> = fqan.split('/').collect();
    let capability = take_value(parts.pop());
    let role = take_value(parts.pop());
    Fqan { vo_group: parts.join("/"), role, capability }
}

fn take_value(segment: Option<&str>) -> String {
    match segment {
        Some(s) => s.rsplit('=').next().unwrap_or(s).to_string(),
        None => String::new(),
    }
}
