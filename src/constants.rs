//! Permission constants, scores and well-known names

use crate::model::PermissionName;

// Permission bit constants, one per PermissionName
pub const EDIT: u64 = 1;
pub const VIEW: u64 = 1 << 1;
pub const DELETE: u64 = 1 << 2;
pub const CREATE: u64 = 1 << 3;
pub const PUBLISH: u64 = 1 << 4;
pub const ADMIN: u64 = 1 << 5;
pub const REVIEW: u64 = 1 << 6;

/// Permission names checked by the flag calculator, in evaluation order
pub const ELIGIBLE_PERMISSIONS: [PermissionName; 7] = [
    PermissionName::View,
    PermissionName::Edit,
    PermissionName::Delete,
    PermissionName::Create,
    PermissionName::Publish,
    PermissionName::Admin,
    PermissionName::Review,
];

// Well-known role names
pub const CONTRIBUTOR_ROLE_NAME: &str = "Contributor";
pub const TRANSLATOR_PSEUDO_NAME: &str = "Translator";

/// Separator between a key's base and its language restriction
pub const LANG_CODES_MARKER: &str = "-in-langCodes-";
pub const LANG_CODES_SEPARATOR: char = ',';

/// Assignee ids starting with this prefix are users, everything else is a group
pub const USER_ID_PREFIX: &str = "uid";

/// Placeholder timestamp the document service replaces on save
pub const DATE_CHANGED_MARKER: &str = "__DATE_CHANGED__";

// Permission name mappings
const PERMISSIONS: &[(PermissionName, u64)] = &[
    (PermissionName::Edit, EDIT),
    (PermissionName::View, VIEW),
    (PermissionName::Delete, DELETE),
    (PermissionName::Create, CREATE),
    (PermissionName::Publish, PUBLISH),
    (PermissionName::Admin, ADMIN),
    (PermissionName::Review, REVIEW),
];

/// Convert a list of permission names to a mask
pub fn names_to_mask(names: &[PermissionName]) -> u64 {
    names
        .iter()
        .filter_map(|n| PERMISSIONS.iter().find(|(k, _)| k == n).map(|(_, v)| v))
        .fold(0, |a, b| a | b)
}

/// Rank of a permission when competing rules of one ACL are compared
pub fn permission_score(name: PermissionName) -> u8 {
    match name {
        PermissionName::View => 1,
        PermissionName::Review => 2,
        PermissionName::Edit => 3,
        PermissionName::Create => 4,
        PermissionName::Delete => 5,
        PermissionName::Publish => 6,
        PermissionName::Admin => 7,
    }
}
