// Domain normalization: user input -> canonical hostname

use url::Url;

/// Reduce arbitrary user input to a canonical hostname.
///
/// Scheme, path, query, port and a leading `www.` are removed and the result
/// is lowercased. Malformed input falls back to plain string surgery, so this
/// never fails; an empty result is left for the caller to reject.
pub fn normalize(input: &str) -> String {
    let input = input.trim();

    let with_scheme = if has_scheme(input) {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    match Url::parse(&with_scheme) {
        Ok(url) => match url.host_str() {
            Some(host) if !host.is_empty() => strip_www(&host.to_lowercase()).to_string(),
            _ => fallback(input),
        },
        Err(_) => fallback(input),
    }
}

fn has_scheme(input: &str) -> bool {
    match input.find("://") {
        Some(idx) if idx > 0 => input[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.'),
        _ => false,
    }
}

fn fallback(input: &str) -> String {
    let lower = input.to_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let host = without_scheme.split('/').next().unwrap_or_default();
    strip_www(host).to_string()
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
