//! Wire types shared with the authorization, user and repository services
//!
//! Enums travel as their integer discriminant, structs as camelCase JSON.

use serde::{Deserialize, Serialize};

use crate::constants::names_to_mask;

/// Declares a fieldless enum that (de)serializes as its `u8` discriminant
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name {
            $($variant = $value),+
        }

        impl TryFrom<u8> for $name {
            type Error = String;
            fn try_from(v: u8) -> Result<Self, Self::Error> {
                match v {
                    $($value => Ok($name::$variant),)+
                    other => Err(format!("invalid {} {}", stringify!($name), other)),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(v: $name) -> u8 {
                v as u8
            }
        }
    };
}

pub(crate) use wire_enum;

wire_enum!(
    /// Named permission a role can hold
    PermissionName {
        Edit = 0,
        View = 1,
        Delete = 2,
        Create = 3,
        Publish = 4,
        Admin = 5,
        Review = 6,
    }
);

wire_enum!(ResourceType { Document = 1, Account = 2 });

wire_enum!(AssigneeType {
    User = 0,
    Account = 1,
    Public = 2,
    Usergroup = 3,
});

wire_enum!(
    /// Whether public (everyone) grants count when listing a user's resource groups
    IncludePublicPolicy {
        Include = 0,
        IncludeExceptAdvertized = 1,
        Exclude = 2,
    }
);

impl Default for IncludePublicPolicy {
    fn default() -> Self {
        IncludePublicPolicy::Include
    }
}

impl PermissionName {
    /// The bit this permission occupies in a permission mask
    pub fn bit(self) -> u64 {
        names_to_mask(&[self])
    }
}

/// A set of resources of one type an ACL rule applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Present on groups returned by `findMyResourceGroups`, encodes restrictions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_key: Option<String>,
}

impl ResourceGroup {
    pub fn new(resource_type: ResourceType, ids: Vec<String>) -> Self {
        ResourceGroup { resource_type, ids, name: None, id: None, resource_group_key: None }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.resource_group_key = Some(key.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub name: PermissionName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<PermissionName> for Permission {
    fn from(name: PermissionName) -> Self {
        Permission { name, description: None }
    }
}

/// One rule of an ACL: a resource group and the permissions granted on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePermission {
    pub resource: ResourceGroup,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeGroup {
    #[serde(rename = "type")]
    pub assignee_type: AssigneeType,
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Narrows a role grant, currently to a set of language codes
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclRestrictionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_codes: Option<Vec<String>>,
}

impl AclRestrictionSet {
    pub fn languages<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AclRestrictionSet { language_codes: Some(codes.into_iter().map(Into::into).collect()) }
    }

    /// Language codes when the restriction is non-empty
    pub fn restricted_languages(&self) -> Option<&[String]> {
        match self.language_codes.as_deref() {
            Some(codes) if !codes.is_empty() => Some(codes),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acl {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub assignees: Vec<AssigneeGroup>,
    #[serde(default)]
    pub rules: Vec<ResourcePermission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restriction_set: Option<AclRestrictionSet>,
    pub role_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub role_id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<PermissionName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default)]
    pub is_builtin: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_invisible: Option<bool>,
}

impl Role {
    /// Permission mask of this role, duplicates collapsed
    pub fn mask(&self) -> u64 {
        names_to_mask(&self.permissions)
    }
}

/// The resource groups on which the current user holds one permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionMap {
    pub permission: PermissionName,
    #[serde(default)]
    pub resources: Vec<ResourceGroup>,
}

/// A permission the current user holds on the items in view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionFlag {
    pub permission_name: PermissionName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_codes: Option<Vec<String>>,
}

impl PermissionFlag {
    pub fn unrestricted(permission_name: PermissionName) -> Self {
        PermissionFlag { permission_name, language_codes: None }
    }

    pub fn restricted(permission_name: PermissionName, codes: Vec<String>) -> Self {
        PermissionFlag { permission_name, language_codes: Some(codes) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usergroup {
    pub id: String,
    pub name: String,
}

/// One element of a breadcrumb path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Item { id: id.into(), name: None }
    }
}

/// Flattened fact: an assignee holds a permission on a resource through an ACL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewableResourcePermission {
    pub resource_type: ResourceType,
    pub resource_id: String,
    /// Set when the grant comes from an ancestor of the queried resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestor_resource_id: Option<String>,
    pub assignee_type: AssigneeType,
    /// `None` for public assignees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    /// Best permission of the winning rule, `None` when that rule grants nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<PermissionName>,
    pub acl_id: String,
    pub role_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl_restriction_set: Option<AclRestrictionSet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePermissionMap {
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub permissions: Vec<ViewableResourcePermission>,
}

/// Row of the access table: who has which role on a document, and through which ACL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDataAssignee {
    pub acl_id: String,
    pub label: String,
    pub id: String,
    pub is_inherited_acl: bool,
    pub role_name: String,
    pub ui_role_name: String,
    #[serde(rename = "type")]
    pub assignee_type: AssigneeType,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl_restriction_set: Option<AclRestrictionSet>,
    pub acl_key: String,
}
