//! Group membership derived from device snapshots

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use wam_api::PropertyMap;

use crate::model::{GroupId, GroupRecord};
use crate::synonyms::{self, GROUPED_FLAG_KEYS, GROUP_ID_KEYS, GROUP_NAME_KEYS};

/// Pure bookkeeping of which devices belong to which groups.
///
/// Membership only grows through [`derive_group`](GroupManager::derive_group).
/// A snapshot without group fields never removes a device from a group; only
/// [`remove_member`](GroupManager::remove_member) and
/// [`clear`](GroupManager::clear) do.
#[derive(Debug, Default, Clone)]
pub struct GroupManager {
    groups: BTreeMap<GroupId, BTreeSet<IpAddr>>,
}

/// Group a snapshot says its device belongs to, if any
pub fn group_id_from_snapshot(snapshot: &PropertyMap) -> Option<GroupId> {
    if let Some(id) = synonyms::resolve(snapshot, GROUP_ID_KEYS) {
        return Some(GroupId::new(id));
    }
    if let Some(name) = synonyms::resolve(snapshot, GROUP_NAME_KEYS) {
        return Some(GroupId::from_group_name(&name));
    }
    if synonyms::is_flagged(snapshot, GROUPED_FLAG_KEYS) {
        return Some(GroupId::anonymous());
    }
    None
}

impl GroupManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `ip` to the group its snapshot names. Idempotent.
    pub fn derive_group(&mut self, ip: IpAddr, snapshot: &PropertyMap) -> Option<GroupId> {
        let id = group_id_from_snapshot(snapshot)?;
        if self.groups.entry(id.clone()).or_default().insert(ip) {
            tracing::debug!("{} joined group {}", ip, id);
        }
        Some(id)
    }

    /// First group (by id order) containing `ip`
    pub fn group_of(&self, ip: IpAddr) -> Option<GroupId> {
        self.groups
            .iter()
            .find(|(_, members)| members.contains(&ip))
            .map(|(id, _)| id.clone())
    }

    pub fn members(&self, id: &GroupId) -> Option<Vec<IpAddr>> {
        self.groups.get(id).map(|members| members.iter().copied().collect())
    }

    pub fn all_groups(&self) -> Vec<GroupRecord> {
        self.groups
            .iter()
            .map(|(id, members)| GroupRecord {
                id: id.clone(),
                members: members.clone(),
            })
            .collect()
    }

    pub fn is_grouped(&self, ip: IpAddr) -> bool {
        self.groups.values().any(|members| members.contains(&ip))
    }

    /// Drop `ip` from every group, removing groups left empty
    pub fn remove_member(&mut self, ip: IpAddr) {
        self.groups.retain(|_, members| {
            members.remove(&ip);
            !members.is_empty()
        });
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
