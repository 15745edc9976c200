//! Profile model definitions
//!
//! Contains the canonical, source-format independent representation of one
//! decoded proxy configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::group::GroupId;

/// Represents the kind of a profile.
/// This is the canonical discriminator used across decoders, store and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Socks,
    Shadowsocks,
    VMess,
    Trojan,
}

impl ProfileKind {
    /// Name used by the store and by structured documents.
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKind::Socks => "socks",
            ProfileKind::Shadowsocks => "shadowsocks",
            ProfileKind::VMess => "vmess",
            ProfileKind::Trojan => "trojan",
        }
    }

    /// Human-readable name used in change notices.
    pub fn display_name(self) -> &'static str {
        match self {
            ProfileKind::Socks => "Socks",
            ProfileKind::Shadowsocks => "Shadowsocks",
            ProfileKind::VMess => "VMess",
            ProfileKind::Trojan => "Trojan",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport settings shared by the stream based kinds (vmess, trojan).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Network type: tcp, ws, grpc, h2, ...
    pub network: String,
    /// Either empty (plain) or "tls".
    pub security: String,
    pub sni: String,
    pub allow_insecure: bool,
    pub path: String,
    /// Host header (ws) or host list (h2).
    pub host: String,
    pub max_early_data: i32,
    pub early_data_header_name: String,
}

impl Default for StreamSettings {
    fn default() -> Self {
        StreamSettings {
            network: "tcp".to_string(),
            security: String::new(),
            sni: String::new(),
            allow_insecure: false,
            path: String::new(),
            host: String::new(),
            max_early_data: 0,
            early_data_header_name: String::new(),
        }
    }
}

impl StreamSettings {
    pub fn is_tls(&self) -> bool {
        self.security == "tls"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocksVersion {
    #[serde(rename = "4")]
    V4,
    #[serde(rename = "4a")]
    V4a,
    #[serde(rename = "5")]
    V5,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocksBean {
    pub version: SocksVersion,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Default for SocksBean {
    fn default() -> Self {
        SocksBean {
            version: SocksVersion::V5,
            username: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowsocksBean {
    pub method: String,
    pub password: String,
    /// SIP003 plugin directive, `name;key=value;...`. Empty when unused.
    pub plugin: String,
}

impl Default for ShadowsocksBean {
    fn default() -> Self {
        ShadowsocksBean {
            method: "aes-128-gcm".to_string(),
            password: String::new(),
            plugin: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct VMessBean {
    pub uuid: String,
    pub alter_id: i32,
    /// Client-side security method: auto, aes-128-gcm, chacha20-poly1305, none, ...
    pub security: String,
    pub stream: StreamSettings,
}

impl Default for VMessBean {
    fn default() -> Self {
        VMessBean {
            uuid: String::new(),
            alter_id: 0,
            security: "auto".to_string(),
            stream: StreamSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TrojanBean {
    pub password: String,
    pub stream: StreamSettings,
}

impl Default for TrojanBean {
    fn default() -> Self {
        TrojanBean {
            password: String::new(),
            stream: StreamSettings {
                security: "tls".to_string(),
                ..StreamSettings::default()
            },
        }
    }
}

/// Kind-specific payload of a profile. The variant is the profile's kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProxyBean {
    Socks(SocksBean),
    Shadowsocks(ShadowsocksBean),
    VMess(VMessBean),
    Trojan(TrojanBean),
}

impl ProxyBean {
    pub fn new(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Socks => ProxyBean::Socks(SocksBean::default()),
            ProfileKind::Shadowsocks => ProxyBean::Shadowsocks(ShadowsocksBean::default()),
            ProfileKind::VMess => ProxyBean::VMess(VMessBean::default()),
            ProfileKind::Trojan => ProxyBean::Trojan(TrojanBean::default()),
        }
    }

    pub fn kind(&self) -> ProfileKind {
        match self {
            ProxyBean::Socks(_) => ProfileKind::Socks,
            ProxyBean::Shadowsocks(_) => ProfileKind::Shadowsocks,
            ProxyBean::VMess(_) => ProfileKind::VMess,
            ProxyBean::Trojan(_) => ProfileKind::Trojan,
        }
    }

    /// Transport settings, for the kinds that carry them.
    pub fn stream(&self) -> Option<&StreamSettings> {
        match self {
            ProxyBean::VMess(bean) => Some(&bean.stream),
            ProxyBean::Trojan(bean) => Some(&bean.stream),
            _ => None,
        }
    }
}

/// Store-assigned identity of a persisted profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub u32);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents one proxy configuration.
///
/// The kind is carried by the [`ProxyBean`] variant, so it can not drift away
/// from the kind-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// `None` until the store persists the profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProfileId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub name: String,
    pub server_address: String,
    pub server_port: u16,
    pub bean: ProxyBean,
}

impl Profile {
    /// Create an empty, unpersisted profile of the given kind.
    pub fn new(kind: ProfileKind) -> Self {
        Profile {
            id: None,
            group_id: None,
            name: String::new(),
            server_address: String::new(),
            server_port: 0,
            bean: ProxyBean::new(kind),
        }
    }

    pub fn kind(&self) -> ProfileKind {
        self.bean.kind()
    }

    /// True if both values refer to the same stored record.
    ///
    /// Profiles that were never persisted have no identity and are never
    /// identity-equal, not even to themselves.
    pub fn same_identity(&self, other: &Profile) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }

    /// True if both values describe the same proxy. The display name, the
    /// identity and the owning group are not part of the content.
    pub fn content_eq(&self, other: &Profile) -> bool {
        self.server_address == other.server_address
            && self.server_port == other.server_port
            && self.bean == other.bean
    }

    /// Label used in change notices, e.g. `[VMess] Tokyo 01`.
    pub fn display_type_and_name(&self) -> String {
        let name = if self.name.is_empty() {
            format!("{}:{}", self.server_address, self.server_port)
        } else {
            self.name.clone()
        };
        format!("[{}] {}", self.kind().display_name(), name)
    }
}
