//! Device path helpers
//!
//! Device paths are RESTCONF-style: `/`-separated segments where a list
//! instance is written `name=key1,key2` with percent-encoded key values.

/// Percent-encode a list key value for use inside a path segment
///
/// Only RFC 3986 unreserved characters pass through unchanged, so `/`, `,`
/// and `=` inside key values can never be mistaken for path syntax.
pub fn encode_key(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Drop list instance selectors from every segment
///
/// `conf:/configure/port=1%2F1%2F1/ethernet` becomes
/// `conf:/configure/port/ethernet`. Schema facts are the same for every
/// instance, so this is the key used to cache them.
pub fn strip_selectors(path: &str) -> String {
    path.split('/')
        .map(|segment| segment.split_once('=').map_or(segment, |(name, _)| name))
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of the list holding the instance `path` points at
///
/// `conf:/configure/sap=a` becomes `conf:/configure/sap`. A path whose last
/// segment has no selector already names a list and is returned as is.
pub fn list_path(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    let start = path.rfind('/').map_or(0, |i| i + 1);
    match path[start..].find('=') {
        Some(eq) => &path[..start + eq],
        None => path,
    }
}

/// Join a base device path and a relative path
pub fn join_path(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    match (base.is_empty(), relative.is_empty()) {
        (true, _) => relative.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{relative}"),
    }
}

/// `true` when `path` equals `prefix` or lies below it
///
/// Matching happens on whole segments: `ethernet/lldp` covers
/// `ethernet/lldp/admin` but not `ethernet/lldp-agent`.
pub fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return false;
    }
    let path = path.trim_matches('/');
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
