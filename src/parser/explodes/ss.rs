use super::common::split_server_port;
use crate::error::DecodeError;
use crate::models::{Profile, ProfileKind, ProxyBean};
use crate::utils::base64::url_safe_base64_decode;
use crate::utils::url::url_decode;

/// Parse a Shadowsocks link into a Profile
///
/// Two layouts are understood:
/// * SIP002: `ss://userinfo@host:port/?plugin=...#name`, where userinfo is
///   base64url(`method:password`) or percent-encoded plain `method:password`;
/// * legacy: `ss://base64(method:password@host:port)#name`.
pub fn explode_ss(ss: &str) -> Result<Profile, DecodeError> {
    let content = ss.strip_prefix("ss://").ok_or(DecodeError::UnknownScheme)?;

    // Extract fragment (remark) if present
    let (content, name) = match content.split_once('#') {
        Some((content, remark)) => (content, url_decode(remark)),
        None => (content, String::new()),
    };

    // Extract plugin from the query parameters
    let content = content.replace("/?", "?");
    let (content, plugin) = match content.split_once('?') {
        Some((main, query)) => {
            let plugin = url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "plugin")
                .map(|(_, value)| value.into_owned())
                .unwrap_or_default();
            (main.to_string(), plugin)
        }
        None => (content, String::new()),
    };

    let (method, password, server, port) = match content.rsplit_once('@') {
        Some((userinfo, server_port)) => {
            let secret = url_safe_base64_decode(userinfo)
                .filter(|decoded| decoded.contains(':'))
                .unwrap_or_else(|| url_decode(userinfo));
            let (method, password) = split_method_password(&secret)?;
            let (server, port) = split_server_port(server_port)?;
            (method, password, server, port)
        }
        None => {
            let decoded = url_safe_base64_decode(&content).ok_or(DecodeError::Base64)?;
            let (secret, server_port) = decoded
                .rsplit_once('@')
                .ok_or(DecodeError::MissingField("server"))?;
            let (method, password) = split_method_password(secret)?;
            let (server, port) = split_server_port(server_port)?;
            (method, password, server, port)
        }
    };

    let mut profile = Profile::new(ProfileKind::Shadowsocks);
    profile.name = name;
    profile.server_address = server;
    profile.server_port = port;
    if let ProxyBean::Shadowsocks(bean) = &mut profile.bean {
        bean.method = method;
        bean.password = password;
        bean.plugin = plugin;
    }

    Ok(profile)
}

/// `method:password`; the password may itself contain colons.
fn split_method_password(secret: &str) -> Result<(String, String), DecodeError> {
    let (method, password) = secret
        .split_once(':')
        .ok_or(DecodeError::MissingField("password"))?;
    if method.is_empty() {
        return Err(DecodeError::MissingField("method"));
    }
    Ok((method.to_lowercase(), password.to_string()))
}
