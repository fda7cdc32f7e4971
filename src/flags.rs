//! Permission flags of the current user on the items in view

use std::collections::HashSet;

use tracing::debug;

use crate::constants::ELIGIBLE_PERMISSIONS;
use crate::keys::{extract_languages_from_resource_group_key, is_restricted_resource_group};
use crate::model::{Item, PermissionFlag, PermissionMap, PermissionName, ResourceGroup, ResourceType};

/// Unique document resource groups of a permission map, in first-seen order
fn document_resource_groups(map: &PermissionMap) -> Vec<&ResourceGroup> {
    let mut seen = Vec::new();
    for group in map.resources.iter().filter(|g| g.resource_type == ResourceType::Document) {
        if !seen.contains(&group) {
            seen.push(group);
        }
    }
    seen
}

fn intersects(ids: &[String], other: &[String]) -> bool {
    ids.iter().any(|id| other.contains(id))
}

fn match_in_breadcrumbs_paths(ids: &[String], breadcrumbs_paths: &[Vec<Item>]) -> bool {
    breadcrumbs_paths
        .iter()
        .flatten()
        .any(|item| ids.contains(&item.id))
}

fn find_map(maps: &[PermissionMap], permission: PermissionName) -> Option<&PermissionMap> {
    maps.iter().find(|m| m.permission == permission)
}

/// Flags for every permission the user holds on the breadcrumbs or the extra items.
///
/// Per permission name only the first matching resource group counts; its key
/// decides whether the flag is language restricted. When the user can edit in
/// specific languages only, PUBLISH and REVIEW flags scoped to exactly those
/// languages are appended.
pub fn calculate_permission_flags(
    breadcrumbs_paths: &[Vec<Item>],
    permission_maps: &[PermissionMap],
    extra_ids: &[String],
) -> Vec<PermissionFlag> {
    let mut flags = calculate_general_permission_flags(breadcrumbs_paths, permission_maps, extra_ids);
    let translator_languages = calculate_translator_languages(breadcrumbs_paths, permission_maps, extra_ids);
    if !translator_languages.is_empty() {
        flags.push(PermissionFlag::restricted(PermissionName::Publish, translator_languages.clone()));
        flags.push(PermissionFlag::restricted(PermissionName::Review, translator_languages));
    }
    debug!(flags = flags.len(), "calculated permission flags");
    flags
}

fn calculate_general_permission_flags(
    breadcrumbs_paths: &[Vec<Item>],
    permission_maps: &[PermissionMap],
    extra_ids: &[String],
) -> Vec<PermissionFlag> {
    let mut flags = Vec::new();
    for permission in ELIGIBLE_PERMISSIONS {
        let Some(map) = find_map(permission_maps, permission) else { continue };
        let matched = document_resource_groups(map).into_iter().find(|group| {
            intersects(&group.ids, extra_ids) || match_in_breadcrumbs_paths(&group.ids, breadcrumbs_paths)
        });
        if let Some(group) = matched {
            flags.push(PermissionFlag {
                permission_name: permission,
                language_codes: extract_languages_from_resource_group_key(group.resource_group_key.as_deref()),
            });
        }
    }
    flags
}

/// Languages in which the user may edit through a language-restricted grant.
/// Unrestricted edit grants contribute nothing.
pub fn calculate_translator_languages(
    breadcrumbs_paths: &[Vec<Item>],
    permission_maps: &[PermissionMap],
    extra_ids: &[String],
) -> Vec<String> {
    let Some(map) = find_map(permission_maps, PermissionName::Edit) else { return Vec::new() };
    let mut languages: Vec<String> = Vec::new();
    for group in document_resource_groups(map) {
        let matches = (!extra_ids.is_empty() && intersects(&group.ids, extra_ids))
            || match_in_breadcrumbs_paths(&group.ids, breadcrumbs_paths);
        if !matches {
            continue;
        }
        let Some(codes) = extract_languages_from_resource_group_key(group.resource_group_key.as_deref()) else {
            continue;
        };
        for code in codes {
            if !languages.contains(&code) {
                languages.push(code);
            }
        }
    }
    languages
}

/// Permission names usable in one language, unrestricted flags always count
pub fn permissions_for_language_code(flags: &[PermissionFlag], language_code: &str) -> Vec<PermissionName> {
    let mut names = Vec::new();
    for flag in flags {
        if names.contains(&flag.permission_name) {
            continue;
        }
        let applies = match &flag.language_codes {
            None => true,
            Some(codes) => codes.iter().any(|c| c == language_code),
        };
        if applies {
            names.push(flag.permission_name);
        }
    }
    names
}

/// Options for [`flags_contain_permissions`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagQuery<'a> {
    /// Require every requested permission instead of any
    pub require_all: bool,
    /// Language a restricted flag has to cover to count
    pub language_code: Option<&'a str>,
}

pub fn flags_contain_permissions(
    flags: &[PermissionFlag],
    permission_names: &[PermissionName],
    query: FlagQuery<'_>,
) -> bool {
    let held = |permission: &PermissionName| {
        flags.iter().any(|flag| {
            if flag.permission_name != *permission {
                return false;
            }
            match (&flag.language_codes, query.language_code) {
                (None, _) => true,
                (Some(codes), Some(lang)) => codes.iter().any(|c| c == lang),
                (Some(_), None) => false,
            }
        })
    };
    if query.require_all {
        permission_names.iter().all(held)
    } else {
        permission_names.iter().any(held)
    }
}

/// Drop the resource groups the user only holds through language-restricted grants
pub fn filter_permissions_with_restrictions(permissions: &[PermissionMap]) -> Vec<PermissionMap> {
    permissions
        .iter()
        .map(|map| PermissionMap {
            permission: map.permission,
            resources: map
                .resources
                .iter()
                .filter(|g| !is_restricted_resource_group(g))
                .cloned()
                .collect(),
        })
        .collect()
}

/// Unique item ids covered by the given permissions (all permissions when `None`)
pub fn get_item_ids_from_permission_map(
    permissions: &[PermissionMap],
    permission_names: Option<&[PermissionName]>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    permissions
        .iter()
        .filter(|map| permission_names.map_or(true, |names| names.contains(&map.permission)))
        .flat_map(|map| map.resources.iter())
        .flat_map(|group| group.ids.iter())
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

/// Whether an unrestricted grant of `permission` covers any item of the path
pub fn check_has_full_permission_in_current_collection(
    permissions: &[PermissionMap],
    breadcrumbs_path: &[Item],
    permission: PermissionName,
) -> bool {
    let unrestricted = filter_permissions_with_restrictions(permissions);
    let ids = get_item_ids_from_permission_map(&unrestricted, Some(&[permission][..]));
    breadcrumbs_path.iter().any(|item| ids.contains(&item.id))
}

/// Whether the user holds an unrestricted grant of `permission` on any item
pub fn check_has_full_permission_anywhere(permissions: &[PermissionMap], permission: PermissionName) -> bool {
    let unrestricted = filter_permissions_with_restrictions(permissions);
    !get_item_ids_from_permission_map(&unrestricted, Some(&[permission][..])).is_empty()
}
