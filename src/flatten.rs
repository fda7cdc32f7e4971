//! Flattening ACLs into per-assignee permission facts

use tracing::debug;

use crate::constants::permission_score;
use crate::error::{AccessError, Result};
use crate::model::{
    Acl, AssigneeType, PermissionName, ResourcePermission, ResourcePermissionMap, ResourceType,
    ViewableResourcePermission,
};

/// Highest-ranked permission of a rule, `None` when the rule grants nothing
pub fn best_permission(rule: &ResourcePermission) -> Option<PermissionName> {
    rule.permissions
        .iter()
        .map(|p| p.name)
        .max_by_key(|name| permission_score(*name))
}

/// Score of a rule: the score of its best permission, 0 for an empty rule
#[inline]
pub fn rule_score(rule: &ResourcePermission) -> u8 {
    best_permission(rule).map(permission_score).unwrap_or(0)
}

/// Select the rule whose best permission outranks every other rule's.
/// On equal scores the first rule wins.
pub fn pick_rule_from_acl(acl: &Acl) -> Result<&ResourcePermission> {
    let mut rules = acl.rules.iter();
    let mut best = rules
        .next()
        .ok_or_else(|| AccessError::AclWithoutRules { acl_id: acl.id.clone() })?;
    let mut best_score = rule_score(best);
    for rule in rules {
        let score = rule_score(rule);
        if score > best_score {
            best = rule;
            best_score = score;
        }
    }
    Ok(best)
}

/// Flatten the ACLs of one resource into (resource, assignee, permission) facts.
///
/// Each ACL contributes one entry per (rule resource id, assignee id) pair of its
/// winning rule; a public assignee contributes one entry without an id. Entries
/// whose rule resource differs from `resource_id` are marked inherited through
/// `ancestor_resource_id`.
pub fn build_resource_permission_map(
    resource_type: ResourceType,
    resource_id: &str,
    acls: &[Acl],
) -> Result<ResourcePermissionMap> {
    let mut permissions = Vec::new();
    for acl in acls {
        let rule = pick_rule_from_acl(acl)?;
        let permission = best_permission(rule);
        for rule_resource_id in &rule.resource.ids {
            let ancestor_resource_id =
                (rule_resource_id != resource_id).then(|| rule_resource_id.clone());
            for group in &acl.assignees {
                let ids: Vec<Option<&String>> = if group.assignee_type == AssigneeType::Public {
                    vec![None]
                } else {
                    group.ids.iter().map(Some).collect()
                };
                for assignee_id in ids {
                    permissions.push(ViewableResourcePermission {
                        resource_type,
                        resource_id: resource_id.to_string(),
                        ancestor_resource_id: ancestor_resource_id.clone(),
                        assignee_type: group.assignee_type,
                        assignee_id: assignee_id.cloned(),
                        permission,
                        acl_id: acl.id.clone(),
                        role_id: acl.role_id.clone(),
                        acl_restriction_set: acl.restriction_set.clone(),
                    });
                }
            }
        }
    }
    debug!(resource_id, acls = acls.len(), entries = permissions.len(), "flattened resource acls");
    Ok(ResourcePermissionMap {
        resource_type,
        resource_id: resource_id.to_string(),
        permissions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssigneeGroup, Permission, ResourceGroup};

    fn rule(ids: &[&str], perms: &[PermissionName]) -> ResourcePermission {
        ResourcePermission {
            resource: ResourceGroup::new(ResourceType::Document, ids.iter().map(|s| s.to_string()).collect()),
            permissions: perms.iter().map(|p| Permission::from(*p)).collect(),
        }
    }

    fn acl(rules: Vec<ResourcePermission>) -> Acl {
        Acl {
            id: "acl-1".into(),
            name: String::new(),
            description: None,
            account_id: "aid".into(),
            assignees: vec![AssigneeGroup { assignee_type: AssigneeType::User, ids: vec!["uid-1".into()] }],
            rules,
            restriction_set: None,
            role_id: "role".into(),
        }
    }

    #[test]
    fn empty_rule_scores_zero() {
        assert_eq!(rule_score(&rule(&["a"], &[])), 0);
        assert_eq!(best_permission(&rule(&["a"], &[])), None);
    }

    #[test]
    fn first_rule_wins_ties() {
        let a = acl(vec![
            rule(&["first"], &[PermissionName::Edit]),
            rule(&["second"], &[PermissionName::Edit, PermissionName::View]),
        ]);
        assert_eq!(pick_rule_from_acl(&a).unwrap().resource.ids, vec!["first".to_string()]);
    }

    #[test]
    fn no_rules_is_an_error() {
        let err = pick_rule_from_acl(&acl(vec![])).unwrap_err();
        assert!(matches!(err, AccessError::AclWithoutRules { ref acl_id } if acl_id == "acl-1"));
    }

    #[test]
    fn direct_rule_has_no_ancestor() {
        let map = build_resource_permission_map(
            ResourceType::Document,
            "doc",
            &[acl(vec![rule(&["doc", "parent"], &[PermissionName::View])])],
        )
        .unwrap();
        assert_eq!(map.permissions.len(), 2);
        assert_eq!(map.permissions[0].ancestor_resource_id, None);
        assert_eq!(map.permissions[1].ancestor_resource_id.as_deref(), Some("parent"));
        assert_eq!(map.permissions[1].permission, Some(PermissionName::View));
    }
}
