use url::Url;

use super::common::{port_of, server_of};
use crate::error::DecodeError;
use crate::models::{Profile, ProfileKind, ProxyBean};
use crate::utils::url::{fragment, is_truthy, query_map, url_decode};

const DEFAULT_TROJAN_PORT: u16 = 443;

/// Parse a Trojan link into a Profile
///
/// `trojan://password@host:port?sni=..&allowInsecure=1&type=ws&path=..#name`
pub fn explode_trojan(trojan: &str) -> Result<Profile, DecodeError> {
    let url = Url::parse(trojan)?;

    let password = url_decode(url.username());
    if password.is_empty() {
        return Err(DecodeError::MissingField("password"));
    }
    let server = server_of(&url)?;
    let port = port_of(&url, Some(DEFAULT_TROJAN_PORT))?;

    let params = query_map(&url);
    let param = |key: &str| params.get(key).cloned().unwrap_or_default();

    // Both "sni" and the older "peer" carry the server name
    let sni = params
        .get("sni")
        .or_else(|| params.get("peer"))
        .cloned()
        .unwrap_or_default();
    let allow_insecure = is_truthy(&param("allowInsecure")) || is_truthy(&param("insecure"));

    let network = match param("type") {
        t if t.is_empty() => "tcp".to_string(),
        t => t,
    };
    let path = if network == "grpc" {
        param("serviceName")
    } else {
        param("path")
    };

    let mut profile = Profile::new(ProfileKind::Trojan);
    profile.name = fragment(&url);
    profile.server_address = server;
    profile.server_port = port;
    if let ProxyBean::Trojan(bean) = &mut profile.bean {
        bean.password = password;
        bean.stream.network = network;
        bean.stream.sni = sni;
        bean.stream.allow_insecure = allow_insecure;
        bean.stream.path = path;
        bean.stream.host = param("host");
    }

    Ok(profile)
}
