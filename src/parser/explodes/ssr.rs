use super::common::parse_port;
use crate::error::DecodeError;
use crate::models::{Profile, ProfileKind, ProxyBean};
use crate::utils::base64::url_safe_base64_decode;

/// Parse a ShadowsocksR link into a Shadowsocks Profile
///
/// `ssr://base64url(host:port:protocol:method:obfs:base64url(password)/?params)`
///
/// Only links that a plain Shadowsocks stream plus an obfs plugin can carry
/// are accepted: the protocol must be `origin`, and the obfs must be `plain`,
/// `http_simple` or `tls1.2_ticket_auth`. The latter two become an
/// `obfs-local` plugin directive using `obfsparam` as the obfs host.
pub fn explode_ssr(ssr: &str) -> Result<Profile, DecodeError> {
    let encoded = ssr.strip_prefix("ssr://").ok_or(DecodeError::UnknownScheme)?;
    let decoded = url_safe_base64_decode(encoded).ok_or(DecodeError::Base64)?;

    let (main, query) = match decoded.split_once("/?") {
        Some((main, query)) => (main, query),
        None => (decoded.trim_end_matches('/'), ""),
    };

    // Split from the right: the host may be an IPv6 literal with colons
    let mut parts = main.rsplitn(6, ':');
    let password_encoded = parts.next().ok_or(DecodeError::MissingField("password"))?;
    let obfs = parts.next().ok_or(DecodeError::MissingField("obfs"))?;
    let method = parts.next().ok_or(DecodeError::MissingField("method"))?;
    let protocol = parts.next().ok_or(DecodeError::MissingField("protocol"))?;
    let port = parts.next().ok_or(DecodeError::MissingField("port"))?;
    let server = parts
        .next()
        .map(|s| s.trim_start_matches('[').trim_end_matches(']'))
        .filter(|s| !s.is_empty())
        .ok_or(DecodeError::MissingField("server"))?;

    let port = parse_port(port)?;
    let password = url_safe_base64_decode(password_encoded).ok_or(DecodeError::Base64)?;

    if protocol != "origin" {
        return Err(DecodeError::Unsupported(format!("ssr protocol {}", protocol)));
    }

    let mut obfs_param = String::new();
    let mut remarks = String::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let Some(value) = url_safe_base64_decode(&value) else {
            continue;
        };
        match key.as_ref() {
            "obfsparam" => obfs_param = value,
            "remarks" => remarks = value,
            _ => {}
        }
    }

    let plugin = match obfs {
        "plain" => String::new(),
        "http_simple" => format!("obfs-local;obfs=http;obfs-host={}", obfs_param),
        "tls1.2_ticket_auth" => format!("obfs-local;obfs=tls;obfs-host={}", obfs_param),
        other => return Err(DecodeError::Unsupported(format!("ssr obfs {}", other))),
    };

    let mut profile = Profile::new(ProfileKind::Shadowsocks);
    profile.name = remarks;
    profile.server_address = server.to_string();
    profile.server_port = port;
    if let ProxyBean::Shadowsocks(bean) = &mut profile.bean {
        bean.method = method.to_string();
        bean.password = password;
        bean.plugin = plugin;
    }

    Ok(profile)
}
