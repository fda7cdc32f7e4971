//! Browsing helpers: which part of a collection path the user may open, and
//! whether a collection is publicly readable

use std::collections::HashMap;

use crate::error::Result;
use crate::flags::get_item_ids_from_permission_map;
use crate::flatten::build_resource_permission_map;
use crate::model::{Acl, AssigneeType, PermissionMap, PermissionName, ResourceType};

/// One element of a trimmed collection path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub id: String,
    pub readonly: bool,
}

/// Trim an id path to the part the user can browse.
///
/// Ids before the first permitted one are dropped. From the first id with edit
/// rights (VIEW when the read-only reader mode is on) everything is editable;
/// from the first viewable id everything else is kept read-only.
pub fn trim_path_to_allowed_with_info(
    id_path: &[String],
    permissions: &[PermissionMap],
    is_read_only_reader_on: bool,
) -> Vec<PathEntry> {
    let editable = get_item_ids_from_permission_map(permissions, Some(&[PermissionName::Admin, PermissionName::Edit][..]));
    let readable = get_item_ids_from_permission_map(permissions, Some(&[PermissionName::View][..]));
    let open_ids = if is_read_only_reader_on { &readable } else { &editable };

    let mut path = Vec::new();
    let (mut edit_mode, mut read_only_mode) = (false, false);
    for id in id_path {
        if edit_mode || open_ids.contains(id) {
            edit_mode = true;
            path.push(PathEntry { id: id.clone(), readonly: false });
        } else if read_only_mode || readable.contains(id) {
            read_only_mode = true;
            path.push(PathEntry { id: id.clone(), readonly: true });
        }
    }
    path
}

/// Whether a resource is readable by everyone through one of its own ACLs
pub fn is_publicly_readable(resource_id: &str, acls: &[Acl]) -> Result<bool> {
    let map = build_resource_permission_map(ResourceType::Document, resource_id, acls)?;
    Ok(map
        .permissions
        .iter()
        .filter(|p| p.ancestor_resource_id.as_deref().map_or(true, |a| a == resource_id))
        .any(|p| p.assignee_type == AssigneeType::Public))
}

/// Whether any of the given collections is publicly readable
pub fn any_publicly_readable(parent_ids: &[String], acls: &HashMap<String, Vec<Acl>>) -> Result<bool> {
    for id in parent_ids {
        let resource_acls = acls.get(id).map(Vec::as_slice).unwrap_or_default();
        if is_publicly_readable(id, resource_acls)? {
            return Ok(true);
        }
    }
    Ok(false)
}
