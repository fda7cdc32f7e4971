//! docaccess - Client-side document access evaluation
//!
//! Turns the ACLs and resource groups served by the authorization service into
//! what an editor needs to render: per-assignee permission facts, the current
//! user's permission flags on the items in view, and the access table of a
//! document. Also carries the composer's visual patch builders.

pub mod api;
pub mod assignees;
pub mod binder;
pub mod browse;
#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod flags;
pub mod flatten;
pub mod keys;
pub mod model;
pub mod patch;
pub mod visuals;

pub use api::{
    add_assignees, assignee_type_of, change_assignee_role, ensure_document_acl, remove_assignee,
    toggle_public_access, AuthorizationApi,
};
pub use assignees::{
    apply_role_change, build_access_data_assignees, direct_acls_by_key, filter_assignees, get_ui_role_name, Removal,
};
pub use binder::{Binder, BinderVisual, Thumbnail, Visual, VisualKind};
pub use browse::{any_publicly_readable, is_publicly_readable, trim_path_to_allowed_with_info, PathEntry};
#[cfg(feature = "client")]
pub use client::HttpAuthorizationClient;
pub use config::ClientConfig;
pub use constants::{names_to_mask, permission_score};
pub use context::AccessContext;
pub use error::{AccessError, Result};
pub use flags::{
    calculate_permission_flags, calculate_translator_languages, check_has_full_permission_anywhere,
    check_has_full_permission_in_current_collection, filter_permissions_with_restrictions, flags_contain_permissions,
    get_item_ids_from_permission_map, permissions_for_language_code, FlagQuery,
};
pub use flatten::{best_permission, build_resource_permission_map, pick_rule_from_acl, rule_score};
pub use keys::{
    build_acl_key, build_resource_group_key, extract_languages_from_resource_group_key, is_restricted_resource_group,
    parse_key, resource_type_from_key,
};
pub use model::*;
pub use patch::{apply_patch, merge_patches};
pub use visuals::{
    patch_all_text_meta_timestamps, patch_image_edit_props, patch_image_edit_props_at_index, patch_image_into_position,
    patch_image_move, patch_image_remove, patch_replace_visual, thumbnail_has_id,
};
