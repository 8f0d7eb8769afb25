//! Endpoint canonicalization and validation.
//!
//! Users paste endpoints in many shapes: a bare device key, a host without a
//! scheme, or a full URL copied from a browser with extra path segments and
//! tracking parameters. First-party endpoints always have the shape
//! `<origin>/<device-key>/`, so they are rebuilt from the key. Self-hosted
//! endpoints are trusted as given and only receive a scheme when missing.
//!
//! Nothing here touches the network.

use reqwest::Url;

use crate::error::PushError;

/// Default first-party gateway host.
pub const FIRST_PARTY_HOST: &str = "wzs.app";

/// Length of a first-party device key.
pub const DEVICE_KEY_LEN: usize = 22;

/// Characters allowed in a device key.
///
/// ASCII alphanumerics minus `0`, `1`, `O` and `I`, which are never issued.
/// Lower-case `l` is part of the alphabet.
pub fn is_device_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() && !matches!(c, '0' | '1' | 'O' | 'I')
}

/// Returns true if `s` is exactly one device key.
pub fn is_device_key(s: &str) -> bool {
    s.len() == DEVICE_KEY_LEN && s.chars().all(is_device_key_char)
}

/// Finds the first device key bounded by `/` or the ends of `s`.
pub fn find_device_key(s: &str) -> Option<&str> {
    s.split('/').find(|segment| is_device_key(segment))
}

/// Canonicalizes `raw` against the default first-party host.
pub fn canonicalize(raw: &str) -> String {
    canonicalize_with_host(raw, FIRST_PARTY_HOST)
}

/// Canonicalizes `raw`, treating `host` (and its sub-domains) as first-party.
///
/// Pure and infallible; whether the result is usable is decided by
/// [`is_valid_endpoint`].
pub fn canonicalize_with_host(raw: &str, host: &str) -> String {
    let trimmed = raw.trim();
    if is_device_key(trimmed) {
        return format!("https://{host}/{trimmed}/");
    }

    let with_scheme = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    if !is_first_party(&with_scheme, host) {
        return with_scheme;
    }

    match find_device_key(&with_scheme) {
        Some(key) => {
            let origin = Url::parse(&with_scheme)
                .map(|url| url.origin().ascii_serialization())
                .unwrap_or_else(|_| format!("https://{host}"));
            format!("{origin}/{key}/")
        }
        None => truncate_fallback(&with_scheme).to_string(),
    }
}

/// Returns true if `url` is an absolute `http`/`https` URL with a host.
///
/// Never panics; malformed input is simply invalid.
pub fn is_valid_endpoint(url: &str) -> bool {
    parse_endpoint(url).is_ok()
}

/// Parses and validates an endpoint.
pub fn parse_endpoint(url: &str) -> Result<Url, PushError> {
    let parsed = Url::parse(url).map_err(|e| PushError::InvalidEndpoint(format!("{url}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(PushError::InvalidEndpoint(format!(
            "{url}: unsupported scheme {}",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(PushError::InvalidEndpoint(format!("{url}: missing host")));
    }
    Ok(parsed)
}

/// `<origin>/ping` for the endpoint's gateway.
pub fn ping_url(api_url: &str) -> Result<String, PushError> {
    let parsed = parse_endpoint(api_url)?;
    Ok(format!("{}/ping", parsed.origin().ascii_serialization()))
}

/// Returns true if `url`'s host is `host` or one of its sub-domains.
pub fn is_first_party(url: &str, host: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.host_str().is_some_and(|h| {
            h.eq_ignore_ascii_case(host)
                || h.to_ascii_lowercase()
                    .ends_with(&format!(".{}", host.to_ascii_lowercase()))
        }),
        // unparseable: fall back to a plain substring match
        Err(_) => url.contains(host),
    }
}

/// Cuts `url` right after its `n`-th `/`; unchanged if there are fewer.
pub fn truncate_after_nth_slash(url: &str, n: usize) -> &str {
    match url.match_indices('/').nth(n.saturating_sub(1)) {
        Some((idx, _)) if n > 0 => &url[..=idx],
        _ => url,
    }
}

/// Heuristic for first-party URLs without a recognisable key.
///
/// Keeps `scheme://host/<segment>/` (fourth slash) for URLs with a scheme and
/// `host/<segment>/` (second slash) otherwise. Lossy for unusual paths.
pub fn truncate_fallback(url: &str) -> &str {
    if has_scheme(url) {
        truncate_after_nth_slash(url, 4)
    } else {
        truncate_after_nth_slash(url, 2)
    }
}

fn has_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
