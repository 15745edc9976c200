use log::debug;
use serde_yaml::Value;

use crate::error::DocumentError;
use crate::models::{Profile, ProfileKind, ProxyBean};
use crate::utils::yaml::YamlNode;

/// Marker that identifies a Clash style document.
pub const CLASH_SIGNATURE: &str = "proxies:";

/// True if the content carries the top-level proxy list marker.
pub fn is_clash_document(content: &str) -> bool {
    content.contains(CLASH_SIGNATURE)
}

/// A parsed Clash configuration.
///
/// Parsing happens once, up front, so a malformed document fails before any
/// record is produced. Records are mapped lazily by [`ClashDocument::profiles`].
#[derive(Debug, Clone)]
pub struct ClashDocument {
    root: Value,
}

impl ClashDocument {
    pub fn parse(content: &str) -> Result<Self, DocumentError> {
        let root = serde_yaml::from_str(content)?;
        Ok(ClashDocument { root })
    }

    /// Profiles decoded from the `proxies` list, in document order. Records
    /// of unsupported types or with unusable fields are skipped. Each call
    /// starts a fresh pass over the document.
    pub fn profiles(&self) -> impl Iterator<Item = Profile> + '_ {
        YamlNode::new(&self.root)
            .get("proxies")
            .elements()
            .filter_map(parse_clash_proxy)
    }
}

/// Parse every supported proxy of a Clash configuration.
pub fn parse_clash_yaml(content: &str) -> Result<Vec<Profile>, DocumentError> {
    Ok(ClashDocument::parse(content)?.profiles().collect())
}

/// Map a single proxy record to a Profile, keyed by its `type`.
fn parse_clash_proxy(proxy: YamlNode<'_>) -> Option<Profile> {
    let mut proxy_type = proxy.get("type").as_string_or("");
    if proxy_type == "ss" || proxy_type == "ssr" {
        proxy_type = "shadowsocks".to_string();
    }

    let kind = match proxy_type.as_str() {
        "shadowsocks" => ProfileKind::Shadowsocks,
        "trojan" => ProfileKind::Trojan,
        "vmess" => ProfileKind::VMess,
        other => {
            debug!("Skipping proxy record of type '{}'", other);
            return None;
        }
    };

    let mut profile = Profile::new(kind);
    profile.name = proxy.get("name").as_string_or("");
    profile.server_address = proxy.get("server").as_string_or("");
    let port = proxy.get("port").as_int_or(0);

    if profile.server_address.is_empty() {
        debug!("Skipping proxy record '{}': no server", profile.name);
        return None;
    }
    profile.server_port = match u16::try_from(port) {
        Ok(port) if port > 0 => port,
        _ => {
            debug!("Skipping proxy record '{}': invalid port {}", profile.name, port);
            return None;
        }
    };

    match &mut profile.bean {
        ProxyBean::Shadowsocks(bean) => {
            // ShadowsocksR records can not be represented
            if proxy.get("protocol").is_defined() {
                debug!("Skipping ShadowsocksR record '{}'", profile.name);
                return None;
            }

            bean.method = proxy.get("cipher").as_string_or("");
            if bean.method == "dummy" {
                bean.method = "none".to_string();
            }
            bean.password = proxy.get("password").as_string_or("");

            let plugin = proxy.get("plugin");
            let plugin_opts = proxy.get("plugin-opts");
            if plugin.is_defined() && plugin_opts.is_defined() && plugin.as_string_or("") == "obfs" {
                bean.plugin = format!(
                    "obfs-local;obfs={};obfs-host={}",
                    plugin_opts.get("mode").as_string_or(""),
                    plugin_opts.get("host").as_string_or("")
                );
            }
        }
        ProxyBean::Trojan(bean) => {
            bean.password = proxy.get("password").as_string_or("");
            bean.stream.sni = proxy.get("sni").as_string_or("");
            if proxy.get("skip-cert-verify").as_bool_or(false) {
                bean.stream.allow_insecure = true;
            }
        }
        ProxyBean::VMess(bean) => {
            bean.uuid = proxy.get("uuid").as_string_or("");
            bean.alter_id = clamp_i32(proxy.get("alterId").as_int_or(0));
            bean.security = proxy.get("cipher").as_string_or("auto");
            bean.stream.network = proxy.get("network").as_string_or("tcp");
            bean.stream.sni = proxy.get("sni").as_string_or("");
            if bean.stream.sni.is_empty() {
                bean.stream.sni = proxy.get("servername").as_string_or("");
            }
            if proxy.get("tls").as_bool_or(false) {
                bean.stream.security = "tls".to_string();
            }
            if proxy.get("skip-cert-verify").as_bool_or(false) {
                bean.stream.allow_insecure = true;
            }

            let ws = proxy.get("ws-opts");
            if ws.is_map() {
                for (name, value) in ws.get("headers").entries() {
                    if name.as_string_or("").to_lowercase() == "host" {
                        bean.stream.host = value.as_string_or("");
                    }
                }
                bean.stream.path = ws.get("path").as_string_or("");
                // max-early-data lives on the record, not inside ws-opts
                bean.stream.max_early_data = clamp_i32(proxy.get("max-early-data").as_int_or(0));
                bean.stream.early_data_header_name =
                    ws.get("early-data-header-name").as_string_or("");
            }
        }
        ProxyBean::Socks(_) => return None,
    }

    Some(profile)
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shadowsocks() {
        let yaml = r#"
proxies:
  - type: ss
    name: "Test SS"
    server: "example.com"
    port: 8388
    cipher: dummy
    password: "password"
    plugin: obfs
    plugin-opts:
      mode: tls
      host: bing.com
"#;
        let proxies = parse_clash_yaml(yaml).unwrap();
        assert_eq!(proxies.len(), 1);
        let proxy = &proxies[0];
        assert_eq!(proxy.kind(), ProfileKind::Shadowsocks);
        assert_eq!(proxy.name, "Test SS");
        assert_eq!(proxy.server_address, "example.com");
        assert_eq!(proxy.server_port, 8388);
        match &proxy.bean {
            ProxyBean::Shadowsocks(bean) => {
                assert_eq!(bean.method, "none");
                assert_eq!(bean.password, "password");
                assert_eq!(bean.plugin, "obfs-local;obfs=tls;obfs-host=bing.com");
            }
            other => panic!("unexpected bean {:?}", other),
        }
    }

    #[test]
    fn test_skip_ssr_and_unknown_types() {
        let yaml = r#"
proxies:
  - {type: ssr, name: r, server: a.com, port: 1, cipher: aes-256-cfb, password: p, protocol: auth_aes128_md5, obfs: plain}
  - {type: hysteria2, name: h, server: b.com, port: 443, password: p}
  - {type: socks5, name: s, server: c.com, port: 1080}
  - {type: ss, name: ok, server: d.com, port: 8388, cipher: aes-128-gcm, password: p}
"#;
        let proxies = parse_clash_yaml(yaml).unwrap();
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0].name, "ok");
    }

    #[test]
    fn test_empty_protocol_still_marks_ssr() {
        let yaml = r#"
proxies:
  - {type: ss, name: tilde, server: a.com, port: 1, cipher: aes-256-cfb, password: p, protocol: ~}
  - {type: ss, name: blank, server: b.com, port: 1, cipher: aes-256-cfb, password: p, protocol: }
  - {type: ss, name: ok, server: c.com, port: 1, cipher: aes-256-cfb, password: p}
"#;
        let proxies = parse_clash_yaml(yaml).unwrap();
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0].name, "ok");
    }

    #[test]
    fn test_plugin_other_than_obfs_is_ignored() {
        let yaml = r#"
proxies:
  - name: v2
    type: ss
    server: a.com
    port: 443
    cipher: aes-128-gcm
    password: p
    plugin: v2ray-plugin
    plugin-opts: {mode: websocket}
"#;
        let proxies = parse_clash_yaml(yaml).unwrap();
        match &proxies[0].bean {
            ProxyBean::Shadowsocks(bean) => assert!(bean.plugin.is_empty()),
            other => panic!("unexpected bean {:?}", other),
        }
    }

    #[test]
    fn test_parse_vmess() {
        let yaml = r#"
proxies:
  - type: vmess
    name: "Test VMess"
    server: "example.com"
    port: "443"
    uuid: "b831381d-6324-4d53-ad4f-8cda48b30811"
    alterId: 2
    cipher: "auto"
    network: "ws"
    tls: true
    skip-cert-verify: true
    sni: "sni.example.com"
    max-early-data: 2048
    ws-opts:
      path: "/path"
      max-early-data: 9999
      early-data-header-name: Sec-WebSocket-Protocol
      headers:
        HOST: "cdn.example.com"
        Edge: "edge"
"#;
        let proxies = parse_clash_yaml(yaml).unwrap();
        assert_eq!(proxies.len(), 1);
        let proxy = &proxies[0];
        assert_eq!(proxy.kind(), ProfileKind::VMess);
        assert_eq!(proxy.server_port, 443);
        match &proxy.bean {
            ProxyBean::VMess(bean) => {
                assert_eq!(bean.uuid, "b831381d-6324-4d53-ad4f-8cda48b30811");
                assert_eq!(bean.alter_id, 2);
                assert_eq!(bean.security, "auto");
                assert_eq!(bean.stream.network, "ws");
                assert_eq!(bean.stream.security, "tls");
                assert!(bean.stream.allow_insecure);
                assert_eq!(bean.stream.sni, "sni.example.com");
                assert_eq!(bean.stream.host, "cdn.example.com");
                assert_eq!(bean.stream.path, "/path");
                assert_eq!(bean.stream.max_early_data, 2048);
                assert_eq!(bean.stream.early_data_header_name, "Sec-WebSocket-Protocol");
            }
            other => panic!("unexpected bean {:?}", other),
        }
    }

    #[test]
    fn test_vmess_without_ws_opts_keeps_defaults() {
        let yaml = r#"
proxies:
  - {type: vmess, name: plain, server: a.com, port: 443, uuid: u, alterId: 0, max-early-data: 2048, servername: s.com}
"#;
        let proxies = parse_clash_yaml(yaml).unwrap();
        match &proxies[0].bean {
            ProxyBean::VMess(bean) => {
                assert_eq!(bean.stream.network, "tcp");
                assert_eq!(bean.stream.security, "");
                assert_eq!(bean.stream.max_early_data, 0);
                assert_eq!(bean.stream.sni, "s.com");
                assert!(!bean.stream.allow_insecure);
            }
            other => panic!("unexpected bean {:?}", other),
        }
    }

    #[test]
    fn test_parse_trojan() {
        let yaml = r#"
proxies:
  - type: trojan
    name: "Test Trojan"
    server: "example.com"
    port: 443
    password: "password"
    skip-cert-verify: false
    sni: "example.com"
"#;
        let proxies = parse_clash_yaml(yaml).unwrap();
        assert_eq!(proxies.len(), 1);
        let proxy = &proxies[0];
        assert_eq!(proxy.kind(), ProfileKind::Trojan);
        match &proxy.bean {
            ProxyBean::Trojan(bean) => {
                assert_eq!(bean.password, "password");
                assert_eq!(bean.stream.sni, "example.com");
                assert!(!bean.stream.allow_insecure);
                assert!(bean.stream.is_tls());
            }
            other => panic!("unexpected bean {:?}", other),
        }
    }

    #[test]
    fn test_malformed_fields_do_not_abort_document() {
        let yaml = r#"
proxies:
  - {type: trojan, name: [not, a, string], server: a.com, port: 443, password: {bad: map}}
  - {type: trojan, name: no-port, server: b.com, port: nope, password: p}
  - {type: trojan, name: no-server, port: 443, password: p}
  - {type: trojan, name: empty-server, server: "", port: 443, password: p}
  - {type: trojan, name: big-port, server: d.com, port: 70000, password: p}
  - {type: trojan, name: zero-port, server: e.com, port: 0, password: p}
  - {type: trojan, name: ok, server: c.com, port: 443, password: p}
"#;
        let proxies = parse_clash_yaml(yaml).unwrap();
        assert_eq!(proxies.len(), 2);
        assert_eq!(proxies[0].name, "");
        match &proxies[0].bean {
            ProxyBean::Trojan(bean) => assert_eq!(bean.password, ""),
            other => panic!("unexpected bean {:?}", other),
        }
        assert_eq!(proxies[1].name, "ok");
    }

    #[test]
    fn test_document_failure_and_restartable_iteration() {
        assert!(ClashDocument::parse("proxies: [unclosed").is_err());

        let doc = ClashDocument::parse(
            "proxies:\n  - {type: trojan, name: a, server: a.com, port: 443, password: p}\n  - {type: trojan, name: b, server: b.com, port: 443, password: p}\n",
        )
        .unwrap();
        assert_eq!(doc.profiles().next().map(|p| p.name), Some("a".to_string()));
        assert_eq!(doc.profiles().count(), 2);
    }

    #[test]
    fn test_missing_proxy_list_yields_nothing() {
        let doc = ClashDocument::parse("proxies:\nrules: []\n").unwrap();
        assert_eq!(doc.profiles().count(), 0);
    }
}
