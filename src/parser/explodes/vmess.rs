use serde_json::Value;
use url::Url;

use super::common::{parse_port, port_of, server_of};
use crate::error::DecodeError;
use crate::models::{Profile, ProfileKind, ProxyBean, StreamSettings};
use crate::utils::base64::base64_decode;
use crate::utils::url::{fragment, is_truthy, query_map};

/// Parse a v2rayN style VMess link into a Profile
///
/// `vmess://base64({"v":"2","ps":..,"add":..,"port":..,"id":..,"aid":..,...})`.
/// Numeric fields may be given as JSON numbers or strings.
pub fn explode_vmess(vmess: &str) -> Result<Profile, DecodeError> {
    let encoded = vmess.strip_prefix("vmess://").ok_or(DecodeError::UnknownScheme)?;
    let decoded = base64_decode(encoded).ok_or(DecodeError::Base64)?;
    let json: Value = serde_json::from_str(&decoded)?;

    let add = json_string(&json, "add");
    if add.is_empty() {
        return Err(DecodeError::MissingField("add"));
    }
    let port = parse_port(&json_string(&json, "port"))?;
    let id = json_string(&json, "id");
    if id.is_empty() {
        return Err(DecodeError::MissingField("id"));
    }

    let aid = json_string(&json, "aid").parse::<i32>().unwrap_or(0);
    let scy = non_empty_or(json_string(&json, "scy"), "auto");
    let net = non_empty_or(json_string(&json, "net"), "tcp");
    let mut host = json_string(&json, "host");
    let mut path = json_string(&json, "path");

    // Version 1 links pack "host;path" into the host field
    if json_string(&json, "v") == "1" {
        if let Some((h, p)) = host.clone().split_once(';') {
            host = h.to_string();
            path = p.to_string();
        }
    }

    let security = if json_string(&json, "tls") == "tls" {
        "tls".to_string()
    } else {
        String::new()
    };

    let mut profile = Profile::new(ProfileKind::VMess);
    profile.name = json_string(&json, "ps");
    profile.server_address = add;
    profile.server_port = port;
    if let ProxyBean::VMess(bean) = &mut profile.bean {
        bean.uuid = id;
        bean.alter_id = aid;
        bean.security = scy;
        bean.stream = StreamSettings {
            network: net,
            security,
            sni: json_string(&json, "sni"),
            allow_insecure: is_truthy(&json_string(&json, "allowInsecure")),
            path,
            host,
            ..StreamSettings::default()
        };
    }

    Ok(profile)
}

/// Parse a URL style VMess link into a Profile
///
/// `vmess://uuid@host:port?type=ws&security=tls&sni=..&path=..&host=..#name`
pub fn explode_std_vmess(vmess: &str) -> Result<Profile, DecodeError> {
    let url = Url::parse(vmess)?;
    let uuid = url.username();
    if uuid.is_empty() {
        return Err(DecodeError::MissingField("id"));
    }
    let server = server_of(&url)?;
    let port = port_of(&url, None)?;
    let params = query_map(&url);
    let param = |key: &str| params.get(key).cloned().unwrap_or_default();

    let network = non_empty_or(param("type"), "tcp");
    let path = if network == "grpc" {
        param("serviceName")
    } else {
        param("path")
    };
    let security = if param("security") == "tls" {
        "tls".to_string()
    } else {
        String::new()
    };

    let mut profile = Profile::new(ProfileKind::VMess);
    profile.name = fragment(&url);
    profile.server_address = server;
    profile.server_port = port;
    if let ProxyBean::VMess(bean) = &mut profile.bean {
        bean.uuid = uuid.to_string();
        bean.alter_id = param("alterId").parse().unwrap_or(0);
        bean.security = non_empty_or(param("encryption"), "auto");
        bean.stream = StreamSettings {
            network,
            security,
            sni: param("sni"),
            allow_insecure: is_truthy(&param("allowInsecure")),
            path,
            host: param("host"),
            ..StreamSettings::default()
        };
    }

    Ok(profile)
}

/// String or number field of a JSON object, rendered as text.
fn json_string(json: &Value, key: &str) -> String {
    match &json[key] {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}
