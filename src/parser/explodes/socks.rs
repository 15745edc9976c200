use url::Url;

use super::common::{port_of, server_of};
use crate::error::DecodeError;
use crate::models::{Profile, ProfileKind, ProxyBean, SocksVersion};
use crate::utils::base64::url_safe_base64_decode;
use crate::utils::url::{fragment, url_decode};

const DEFAULT_SOCKS_PORT: u16 = 1080;

/// Parse a SOCKS link into a Profile
///
/// Accepts `socks4://`, `socks4a://`, `socks5://` and `socks://` (SOCKS5).
/// Credentials are either plain `user:pass@` userinfo or a single base64
/// encoded `user:pass` in the username slot.
pub fn explode_socks(socks: &str) -> Result<Profile, DecodeError> {
    let scheme = socks
        .split_once("://")
        .map(|(scheme, _)| scheme)
        .ok_or(DecodeError::UnknownScheme)?;
    let version = match scheme {
        "socks4" => SocksVersion::V4,
        "socks4a" => SocksVersion::V4a,
        "socks5" | "socks" => SocksVersion::V5,
        _ => return Err(DecodeError::UnknownScheme),
    };

    let url = Url::parse(socks)?;
    let server = server_of(&url)?;
    let port = port_of(&url, Some(DEFAULT_SOCKS_PORT))?;

    let mut username = url_decode(url.username());
    let mut password = url.password().map(url_decode).unwrap_or_default();

    if password.is_empty() && !username.is_empty() {
        if let Some((user, pass)) = url_safe_base64_decode(&username)
            .as_deref()
            .and_then(|decoded| decoded.split_once(':'))
        {
            password = pass.to_string();
            username = user.to_string();
        }
    }

    let mut profile = Profile::new(ProfileKind::Socks);
    profile.name = fragment(&url);
    profile.server_address = server;
    profile.server_port = port;
    if let ProxyBean::Socks(bean) = &mut profile.bean {
        bean.version = version;
        bean.username = username;
        bean.password = password;
    }

    Ok(profile)
}
