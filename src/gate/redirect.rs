//! Rewriting of upstream `302` targets.
//!
//! The upstream rewrites links to point through the gate, so a redirect it
//! issues often carries the gate path twice. Everything between the first and
//! the last occurrence of the gate URL is collapsed into a single copy.

use url::Url;

/// Gate URL with leading and trailing slashes removed.
pub fn trimmed_gate_url(gate_url: &str) -> &str {
    gate_url.trim_matches('/')
}

/// Collapse repeated gate URLs in `target`. Targets without it pass unchanged.
pub fn collapse_gate_url(target: &str, gate_url: &str) -> String {
    let needle = trimmed_gate_url(gate_url);
    if needle.is_empty() {
        return target.to_string();
    }
    match (target.find(needle), target.rfind(needle)) {
        (Some(first), Some(last)) => {
            format!("{}{}{}", &target[..first], needle, &target[last + needle.len()..])
        }
        _ => target.to_string(),
    }
}

/// Resolve a `Location` value against the URL that produced it.
///
/// Falls back to the trimmed raw header when it cannot be resolved.
pub fn resolve_location(request_url: &str, location: &str) -> String {
    let location = location.trim();
    Url::parse(request_url)
        .and_then(|base| base.join(location))
        .map(String::from)
        .unwrap_or_else(|_| location.to_string())
}
