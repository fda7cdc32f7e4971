//! Access table rows: who holds which role on a document

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::constants::{CONTRIBUTOR_ROLE_NAME, TRANSLATOR_PSEUDO_NAME, USER_ID_PREFIX};
use crate::keys::build_acl_key;
use crate::model::{AccessDataAssignee, AclRestrictionSet, Role, User, Usergroup, ViewableResourcePermission};

/// How rows of an assignee that is being removed are treated while rebuilding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Removal<'a> {
    /// Removed assignees are already gone from the ACLs
    #[default]
    Hard,
    /// The assignee with this id is pending removal; a later direct row for it is dropped
    Soft(Option<&'a str>),
}

/// Role name shown in the UI: a language-restricted Contributor is a Translator
pub fn get_ui_role_name(role_name: &str, restriction: Option<&AclRestrictionSet>) -> String {
    let restricted = restriction.and_then(|r| r.restricted_languages()).is_some();
    if role_name == CONTRIBUTOR_ROLE_NAME && restricted {
        TRANSLATOR_PSEUDO_NAME.to_string()
    } else {
        role_name.to_string()
    }
}

/// Whether `next` grants strictly more permissions than `previous`
fn is_superior_role_by_name(account_roles: &[Role], previous: &str, next: &str) -> bool {
    let find = |name: &str| account_roles.iter().find(|r| r.name == name);
    match (find(previous), find(next)) {
        (Some(p), Some(n)) => n.mask().count_ones() > p.mask().count_ones(),
        _ => false,
    }
}

struct AssigneeIdentity<'a> {
    id: &'a str,
    name_value: &'a str,
    label: &'a str,
}

fn resolve_assignee<'a>(
    assignee_id: &str,
    users: &'a [User],
    usergroups: &'a [Usergroup],
) -> Option<AssigneeIdentity<'a>> {
    if assignee_id.starts_with(USER_ID_PREFIX) {
        let user = users.iter().find(|u| u.id == assignee_id)?;
        Some(AssigneeIdentity {
            id: &user.id,
            name_value: &user.login,
            label: user.display_name.as_deref().unwrap_or(&user.login),
        })
    } else {
        let group = usergroups.iter().find(|g| g.id == assignee_id)?;
        Some(AssigneeIdentity { id: &group.id, name_value: &group.name, label: &group.name })
    }
}

/// Merge inherited and direct grants into one row per assignee.
///
/// Inherited grants are processed first. A later row for an assignee already in
/// the table replaces it when it is strictly more powerful and either sits at the
/// same inheritance level or is a direct grant over an inherited one.
///
/// A grant whose role id is not among `account_roles` empties the whole table.
pub fn build_access_data_assignees(
    permissions: &[ViewableResourcePermission],
    document_id: &str,
    users: &[User],
    usergroups: &[Usergroup],
    account_roles: &[Role],
    removal: Removal<'_>,
) -> Vec<AccessDataAssignee> {
    let is_inherited = |resource_id: Option<&str>| resource_id.map_or(false, |r| r != document_id);

    let mut ordered: Vec<&ViewableResourcePermission> = permissions.iter().collect();
    ordered.sort_by_key(|p| !is_inherited(p.ancestor_resource_id.as_deref()));

    let mut rows: Vec<AccessDataAssignee> = Vec::new();
    for permission in ordered {
        let Some(assignee_id) = permission.assignee_id.as_deref() else { continue };
        let Some(identity) = resolve_assignee(assignee_id, users, usergroups) else {
            warn!(assignee_id, "skipping unresolvable assignee");
            continue;
        };
        let Some(role) = account_roles.iter().find(|r| r.role_id == permission.role_id) else {
            warn!(role_id = %permission.role_id, acl_id = %permission.acl_id, "unknown role id, access table dropped");
            return Vec::new();
        };

        let restriction = permission.acl_restriction_set.as_ref();
        let row = AccessDataAssignee {
            acl_id: permission.acl_id.clone(),
            label: identity.label.to_string(),
            id: identity.id.to_string(),
            is_inherited_acl: is_inherited(permission.ancestor_resource_id.as_deref()),
            role_name: role.name.clone(),
            ui_role_name: get_ui_role_name(&role.name, restriction),
            assignee_type: permission.assignee_type,
            value: identity.name_value.to_string(),
            acl_restriction_set: permission.acl_restriction_set.clone(),
            acl_key: build_acl_key(&role.name, restriction),
        };

        let existing = rows.iter().position(|r| r.value == row.value);
        match existing {
            Some(_) if is_soft_removed(removal, &row) => {}
            Some(i) if supersedes(account_roles, &rows[i], &row) => rows[i] = row,
            _ => rows.push(row),
        }
    }
    debug!(document_id, rows = rows.len(), "built access table");
    rows
}

fn supersedes(account_roles: &[Role], existing: &AccessDataAssignee, next: &AccessDataAssignee) -> bool {
    let level_allows = existing.is_inherited_acl == next.is_inherited_acl
        || (existing.is_inherited_acl && !next.is_inherited_acl);
    level_allows && is_superior_role_by_name(account_roles, &existing.role_name, &next.role_name)
}

fn is_soft_removed(removal: Removal<'_>, row: &AccessDataAssignee) -> bool {
    match removal {
        Removal::Hard => false,
        Removal::Soft(id) => !row.is_inherited_acl && id == Some(row.id.as_str()),
    }
}

/// Rows whose label contains the term (case-insensitive) or whose value contains
/// the lowercased term
pub fn filter_assignees(rows: &[AccessDataAssignee], search_term: &str) -> Vec<AccessDataAssignee> {
    let term = search_term.to_lowercase();
    rows.iter()
        .filter(|r| r.label.to_lowercase().contains(&term) || r.value.contains(&term))
        .cloned()
        .collect()
}

/// ACL id per ACL key, for the direct rows only
pub fn direct_acls_by_key(rows: &[AccessDataAssignee]) -> HashMap<&str, &str> {
    rows.iter()
        .filter(|r| !r.is_inherited_acl)
        .map(|r| (r.acl_key.as_str(), r.acl_id.as_str()))
        .collect()
}

/// Rows after moving one assignee's direct grant to another role
pub fn apply_role_change(
    rows: &[AccessDataAssignee],
    assignee_id: &str,
    new_acl_id: &str,
    new_role: &Role,
    restriction: Option<&AclRestrictionSet>,
) -> Vec<AccessDataAssignee> {
    rows.iter()
        .map(|row| {
            if row.id != assignee_id || row.is_inherited_acl {
                return row.clone();
            }
            AccessDataAssignee {
                acl_key: build_acl_key(&new_role.name, restriction),
                acl_id: new_acl_id.to_string(),
                role_name: new_role.name.clone(),
                ui_role_name: get_ui_role_name(&new_role.name, restriction),
                acl_restriction_set: restriction.cloned(),
                ..row.clone()
            }
        })
        .collect()
}
