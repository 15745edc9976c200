use serde::{Deserialize, Serialize};

/// Store-assigned identity of a profile group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A group of profiles, usually backed by one subscription URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Subscription URL; empty for groups the user fills by hand.
    #[serde(default)]
    pub url: String,
}

impl Group {
    pub fn new(id: GroupId, name: &str, url: &str) -> Self {
        Group {
            id,
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}
