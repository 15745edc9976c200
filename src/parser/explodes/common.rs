use url::Url;

use crate::error::DecodeError;
use crate::models::Profile;

/// Socks-family prefixes, in the order they are checked.
const SOCKS_PREFIXES: [&str; 4] = ["socks5://", "socks4://", "socks4a://", "socks://"];

/// Explode a proxy link into a Profile
///
/// This function detects the scheme of the link and calls the matching
/// decoder. A link with no known prefix yields [`DecodeError::UnknownScheme`],
/// which callers treat as a silent no-op rather than a failure.
pub fn explode(link: &str) -> Result<Profile, DecodeError> {
    let link = link.trim();

    if SOCKS_PREFIXES.iter().any(|prefix| link.starts_with(prefix)) {
        super::socks::explode_socks(link)
    } else if link.starts_with("ss://") {
        super::ss::explode_ss(link)
    } else if link.starts_with("ssr://") {
        super::ssr::explode_ssr(link)
    } else if link.starts_with("vmess://") {
        // v2rayN JSON form first, then the URL form
        super::vmess::explode_vmess(link).or_else(|_| super::vmess::explode_std_vmess(link))
    } else if link.starts_with("trojan://") {
        super::trojan::explode_trojan(link)
    } else {
        Err(DecodeError::UnknownScheme)
    }
}

/// Server host of a parsed link, without IPv6 brackets.
pub(super) fn server_of(url: &Url) -> Result<String, DecodeError> {
    let host = url
        .host_str()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
        .unwrap_or("");
    if host.is_empty() {
        return Err(DecodeError::MissingField("server"));
    }
    Ok(host.to_string())
}

/// Port of a parsed link, `default` when the link has none.
pub(super) fn port_of(url: &Url, default: Option<u16>) -> Result<u16, DecodeError> {
    match url.port().or(default) {
        Some(0) => Err(DecodeError::InvalidPort("0".to_string())),
        Some(port) => Ok(port),
        None => Err(DecodeError::MissingField("port")),
    }
}

/// Parses a port number written as text. Zero is rejected.
pub(super) fn parse_port(port: &str) -> Result<u16, DecodeError> {
    match port.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(DecodeError::InvalidPort(port.to_string())),
        Ok(p) => Ok(p),
    }
}

/// Splits `host:port` (or `[v6]:port`), tolerating a trailing `/`.
pub(super) fn split_server_port(server_port: &str) -> Result<(String, u16), DecodeError> {
    let server_port = server_port.trim_end_matches('/');
    let (server, port) = server_port
        .rsplit_once(':')
        .ok_or(DecodeError::MissingField("port"))?;
    let server = server.trim_start_matches('[').trim_end_matches(']');
    if server.is_empty() {
        return Err(DecodeError::MissingField("server"));
    }
    Ok((server.to_string(), parse_port(port)?))
}
