//! Session-scoped access state
//!
//! One [`AccessContext`] lives for an application session and is handed to
//! whatever needs the active account, its roles and people, or the current
//! user's permission maps.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::assignees::{build_access_data_assignees, Removal};
use crate::error::{AccessError, Result};
use crate::flags::calculate_permission_flags;
use crate::model::{AccessDataAssignee, Item, PermissionFlag, PermissionMap, Role, User, Usergroup, ViewableResourcePermission};

type Fingerprint = [u8; 32];

#[derive(Debug, Default)]
pub struct AccessContext {
    account_id: Option<String>,
    roles: Vec<Role>,
    users: Vec<User>,
    usergroups: Vec<Usergroup>,
    permission_maps: Vec<PermissionMap>,
    revision: u64,
    flags: Option<(Fingerprint, Vec<PermissionFlag>)>,
}

impl AccessContext {
    pub fn new(account_id: impl Into<String>) -> Self {
        AccessContext { account_id: Some(account_id.into()), ..Default::default() }
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Switch accounts; everything account-scoped is dropped
    pub fn set_account_id(&mut self, account_id: impl Into<String>) {
        let account_id = account_id.into();
        if self.account_id.as_deref() == Some(account_id.as_str()) {
            return;
        }
        debug!(%account_id, "switching active account");
        self.account_id = Some(account_id);
        self.roles.clear();
        self.users.clear();
        self.usergroups.clear();
        self.set_permission_maps(Vec::new());
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn set_roles(&mut self, roles: Vec<Role>) {
        self.roles = roles;
    }

    pub fn set_users(&mut self, users: Vec<User>) {
        self.users = users;
    }

    pub fn set_usergroups(&mut self, usergroups: Vec<Usergroup>) {
        self.usergroups = usergroups;
    }

    pub fn permission_maps(&self) -> &[PermissionMap] {
        &self.permission_maps
    }

    /// Replace the user's permission maps, invalidating cached flags
    pub fn set_permission_maps(&mut self, maps: Vec<PermissionMap>) {
        self.permission_maps = maps;
        self.revision += 1;
        self.flags = None;
    }

    /// Bumped every time the permission maps change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn role(&self, role_id: &str) -> Result<&Role> {
        self.roles
            .iter()
            .find(|r| r.role_id == role_id)
            .ok_or_else(|| AccessError::UnknownRole(role_id.to_string()))
    }

    pub fn role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.name == name)
    }

    /// Permission flags for the items in view. Only the latest
    /// (breadcrumbs, extra ids, permission maps) combination is kept.
    pub fn permission_flags(&mut self, breadcrumbs_paths: &[Vec<Item>], extra_ids: &[String]) -> &[PermissionFlag] {
        let key = fingerprint(breadcrumbs_paths, extra_ids, self.revision);
        if self.flags.as_ref().map_or(true, |(cached, _)| *cached != key) {
            let flags = calculate_permission_flags(breadcrumbs_paths, &self.permission_maps, extra_ids);
            self.flags = Some((key, flags));
        }
        self.flags.as_ref().map(|(_, flags)| flags.as_slice()).unwrap_or_default()
    }

    /// Access table of a document against the account's roles and people
    pub fn access_data_assignees(
        &self,
        permissions: &[ViewableResourcePermission],
        document_id: &str,
        removal: Removal<'_>,
    ) -> Vec<AccessDataAssignee> {
        build_access_data_assignees(permissions, document_id, &self.users, &self.usergroups, &self.roles, removal)
    }

    #[cfg(test)]
    fn cached_flag_sets(&self) -> usize {
        usize::from(self.flags.is_some())
    }
}

fn fingerprint(breadcrumbs_paths: &[Vec<Item>], extra_ids: &[String], revision: u64) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(revision.to_be_bytes());
    for path in breadcrumbs_paths {
        hasher.update(b"p");
        for item in path {
            hasher.update((item.id.len() as u64).to_be_bytes());
            hasher.update(item.id.as_bytes());
        }
    }
    hasher.update(b"x");
    for id in extra_ids {
        hasher.update((id.len() as u64).to_be_bytes());
        hasher.update(id.as_bytes());
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}
