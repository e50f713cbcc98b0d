use regex::Regex;
use std::sync::LazyLock;

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*https?://").expect("valid scheme pattern"));

/// Bare host of a target URL, as network scanners expect it.
///
/// `https://user@example.com:8443/app?x=1` becomes `example.com`. Inputs without a scheme
/// are treated as `host[/path]`.
pub fn extract_host(target: &str) -> String {
    let rest = SCHEME.replace(target, "");
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .trim();

    let host = authority.rsplit('@').next().unwrap_or(authority);

    if host.starts_with('[') {
        // IPv6 literal, keep the brackets' content
        return match host.find(']') {
            Some(end) => host[1..end].to_string(),
            None => host.to_string(),
        };
    }

    match host.split_once(':') {
        Some((name, _port)) => name.to_string(),
        None => host.to_string(),
    }
}
