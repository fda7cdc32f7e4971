//! Authorization service surface and the access-modal flows built on it

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::assignees::{apply_role_change, direct_acls_by_key};
use crate::constants::{CONTRIBUTOR_ROLE_NAME, USER_ID_PREFIX};
use crate::error::Result;
use crate::keys::build_acl_key;
use crate::model::{
    AccessDataAssignee, Acl, AclRestrictionSet, AssigneeType, IncludePublicPolicy, PermissionMap, PermissionName,
    ResourceGroup, ResourceType, Role,
};

/// Operations of the authorization service this crate consumes
#[async_trait]
pub trait AuthorizationApi: Send + Sync {
    async fn account_acls(&self, account_id: &str) -> Result<Vec<Acl>>;

    /// Resource groups on which the current user holds each of `permissions`
    async fn find_my_resource_groups(
        &self,
        account_ids: &[String],
        resource_type: ResourceType,
        permissions: &[PermissionName],
        include_public: IncludePublicPolicy,
    ) -> Result<Vec<PermissionMap>>;

    /// ACLs per resource id for every resource of the group, ancestors' ACLs included
    async fn resource_acls(&self, resource: &ResourceGroup, account_id: &str) -> Result<HashMap<String, Vec<Acl>>>;

    async fn add_acl_assignee(
        &self,
        acl_id: &str,
        account_id: &str,
        assignee_type: AssigneeType,
        assignee_id: &str,
    ) -> Result<Acl>;

    async fn remove_acl_assignee(
        &self,
        acl_id: &str,
        account_id: &str,
        assignee_type: AssigneeType,
        assignee_id: &str,
    ) -> Result<Acl>;

    /// Move an assignee from `old_acl_id` to `acl_id`
    async fn update_acl_assignee(
        &self,
        old_acl_id: &str,
        acl_id: &str,
        account_id: &str,
        assignee_type: AssigneeType,
        assignee_id: &str,
    ) -> Result<Acl>;

    async fn add_document_acl(
        &self,
        account_id: &str,
        document_id: &str,
        role_id: &str,
        restriction: Option<&AclRestrictionSet>,
    ) -> Result<Acl>;

    async fn grant_public_read_access(&self, account_id: &str, document_id: &str) -> Result<Acl>;

    async fn revoke_public_read_access(&self, account_id: &str, document_id: &str) -> Result<Acl>;
}

/// Assignee type implied by an id
pub fn assignee_type_of(assignee_id: &str) -> AssigneeType {
    if assignee_id.starts_with(USER_ID_PREFIX) {
        AssigneeType::User
    } else {
        AssigneeType::Usergroup
    }
}

/// Id of the document's own ACL for `role` with `restriction`, created when missing
pub async fn ensure_document_acl<A: AuthorizationApi + ?Sized>(
    api: &A,
    rows: &[AccessDataAssignee],
    document_id: &str,
    account_id: &str,
    role: &Role,
    restriction: Option<&AclRestrictionSet>,
) -> Result<String> {
    let key = build_acl_key(&role.name, restriction);
    if let Some(acl_id) = direct_acls_by_key(rows).get(key.as_str()) {
        return Ok(acl_id.to_string());
    }
    let acl = api.add_document_acl(account_id, document_id, &role.role_id, restriction).await?;
    debug!(document_id, acl_key = %key, acl_id = %acl.id, "created document acl");
    Ok(acl.id)
}

/// Grant `role` on the document to every assignee id
pub async fn add_assignees<A: AuthorizationApi + ?Sized>(
    api: &A,
    rows: &[AccessDataAssignee],
    document_id: &str,
    account_id: &str,
    role: &Role,
    restriction: Option<&AclRestrictionSet>,
    assignee_ids: &[String],
) -> Result<Vec<Acl>> {
    let acl_id = ensure_document_acl(api, rows, document_id, account_id, role, restriction).await?;
    let mut updated = Vec::with_capacity(assignee_ids.len());
    for id in assignee_ids {
        updated.push(api.add_acl_assignee(&acl_id, account_id, assignee_type_of(id), id).await?);
    }
    debug!(document_id, %acl_id, added = updated.len(), "added assignees");
    Ok(updated)
}

pub async fn remove_assignee<A: AuthorizationApi + ?Sized>(
    api: &A,
    row: &AccessDataAssignee,
    account_id: &str,
) -> Result<Acl> {
    api.remove_acl_assignee(&row.acl_id, account_id, row.assignee_type, &row.id).await
}

/// Move one assignee to another role on the document and return the updated rows.
///
/// A Contributor with an explicitly empty language list is a translator whose
/// languages are still being picked; the move is only persisted once they are.
pub async fn change_assignee_role<A: AuthorizationApi + ?Sized>(
    api: &A,
    rows: &[AccessDataAssignee],
    document_id: &str,
    account_id: &str,
    assignee: &AccessDataAssignee,
    new_role: &Role,
    restriction: Option<&AclRestrictionSet>,
) -> Result<Vec<AccessDataAssignee>> {
    let acl_id = ensure_document_acl(api, rows, document_id, account_id, new_role, restriction).await?;
    let pending_languages = new_role.name == CONTRIBUTOR_ROLE_NAME
        && restriction.is_some_and(|r| r.language_codes.as_ref().is_some_and(Vec::is_empty));
    if pending_languages {
        debug!(assignee = %assignee.id, "translator languages pending, role change not persisted");
    } else {
        api.update_acl_assignee(&assignee.acl_id, &acl_id, account_id, assignee.assignee_type, &assignee.id)
            .await?;
    }
    Ok(apply_role_change(rows, &assignee.id, &acl_id, new_role, restriction))
}

/// Flip public read access on a document
pub async fn toggle_public_access<A: AuthorizationApi + ?Sized>(
    api: &A,
    account_id: &str,
    document_id: &str,
    is_public: bool,
) -> Result<Acl> {
    if is_public {
        api.revoke_public_read_access(account_id, document_id).await
    } else {
        api.grant_public_read_access(account_id, document_id).await
    }
}
