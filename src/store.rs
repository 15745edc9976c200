//! Profile store collaborator
//!
//! The sync pipeline never owns persistence. It talks to a [`ProfileStore`],
//! which assigns identities and keeps group membership. [`MemoryStore`] is a
//! simple implementation that can be snapshotted to JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::{Group, GroupId, Profile, ProfileId};

pub trait ProfileStore {
    /// Persist `profile` in `group` (or in no group) and return its new
    /// identity. Always inserts, even if a content-equal profile exists.
    fn add_profile(&mut self, profile: Profile, group_id: Option<GroupId>) -> ProfileId;

    /// Remove the profile with this identity. Unknown identities are ignored.
    fn delete_profile(&mut self, id: ProfileId);

    /// Snapshot of the profiles of a group, in insertion order.
    fn group_profiles(&self, group_id: GroupId) -> Vec<Profile>;

    fn get_group(&self, group_id: GroupId) -> Option<Group>;
}

/// In-memory profile store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    profiles: Vec<Profile>,
    #[serde(default)]
    next_profile_id: u32,
    #[serde(default)]
    next_group_id: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store snapshot written by [`MemoryStore::save`]. A missing file
    /// yields an empty store.
    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(std::io::Error::from)
    }

    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(std::io::Error::from)?;
        fs::write(path, content)
    }

    pub fn add_group(&mut self, name: &str, url: &str) -> GroupId {
        self.next_group_id += 1;
        let id = GroupId(self.next_group_id);
        self.groups.push(Group::new(id, name, url));
        id
    }

    /// Make sure a group with this id exists, creating an unnamed one if not.
    pub fn ensure_group(&mut self, id: GroupId) {
        if self.groups.iter().all(|g| g.id != id) {
            self.groups.push(Group::new(id, &format!("Group {}", id), ""));
            self.next_group_id = self.next_group_id.max(id.0);
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Every stored profile, in insertion order.
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn get_profile(&self, id: ProfileId) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == Some(id))
    }
}

impl ProfileStore for MemoryStore {
    fn add_profile(&mut self, mut profile: Profile, group_id: Option<GroupId>) -> ProfileId {
        self.next_profile_id += 1;
        let id = ProfileId(self.next_profile_id);
        profile.id = Some(id);
        profile.group_id = group_id;
        self.profiles.push(profile);
        id
    }

    fn delete_profile(&mut self, id: ProfileId) {
        self.profiles.retain(|p| p.id != Some(id));
    }

    fn group_profiles(&self, group_id: GroupId) -> Vec<Profile> {
        self.profiles
            .iter()
            .filter(|p| p.group_id == Some(group_id))
            .cloned()
            .collect()
    }

    fn get_group(&self, group_id: GroupId) -> Option<Group> {
        self.groups.iter().find(|g| g.id == group_id).cloned()
    }
}
