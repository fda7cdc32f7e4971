//! Integration tests for ACL flattening, permission flags and access tables
//!
//! Scenarios mirror what the editor sees: ACL snapshots from the authorization
//! service, the current user's resource groups, and account roles.

use docaccess::*;

// Fixtures

fn ids(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn rule(resource_ids: &[&str], perms: &[PermissionName]) -> ResourcePermission {
    ResourcePermission {
        resource: ResourceGroup::new(ResourceType::Document, ids(resource_ids)),
        permissions: perms.iter().map(|p| Permission::from(*p)).collect(),
    }
}

fn acl(id: &str, role_id: &str, assignees: Vec<AssigneeGroup>, rules: Vec<ResourcePermission>) -> Acl {
    Acl {
        id: id.into(),
        name: id.into(),
        description: None,
        account_id: "aid-1".into(),
        assignees,
        rules,
        restriction_set: None,
        role_id: role_id.into(),
    }
}

fn users_group(v: &[&str]) -> AssigneeGroup {
    AssigneeGroup { assignee_type: AssigneeType::User, ids: ids(v) }
}

fn public_group() -> AssigneeGroup {
    AssigneeGroup { assignee_type: AssigneeType::Public, ids: vec![] }
}

fn role(id: &str, name: &str, permissions: &[PermissionName]) -> Role {
    Role {
        role_id: id.into(),
        name: name.into(),
        permissions: permissions.to_vec(),
        account_id: Some("aid-1".into()),
        is_builtin: true,
        is_default: false,
        description: None,
        is_invisible: None,
    }
}

fn account_roles() -> Vec<Role> {
    vec![
        role("r-reader", "Reader", &[PermissionName::View]),
        role("r-editor", "Editor", &[PermissionName::View, PermissionName::Edit]),
        role(
            "r-admin",
            "Admin",
            &[PermissionName::View, PermissionName::Edit, PermissionName::Publish, PermissionName::Admin],
        ),
    ]
}

fn users() -> Vec<User> {
    vec![
        User { id: "uid-ann".into(), login: "ann@example.com".into(), display_name: Some("Ann".into()) },
        User { id: "uid-bob".into(), login: "bob@example.com".into(), display_name: Some("Bob".into()) },
    ]
}

fn document_group(permission: PermissionName, resource_ids: &[&str], key: &str) -> PermissionMap {
    PermissionMap {
        permission,
        resources: vec![ResourceGroup::new(ResourceType::Document, ids(resource_ids)).with_key(key)],
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn breadcrumbs(v: &[&str]) -> Vec<Vec<Item>> {
    vec![v.iter().map(|id| Item::new(*id)).collect()]
}

// ============================================================================
// Flattening
// ============================================================================

#[test]
fn entry_count_is_resources_times_assignees() {
    let cases: Vec<(Vec<&str>, Vec<&str>)> = vec![
        (vec!["doc"], vec!["uid-ann"]),
        (vec!["doc", "parent"], vec!["uid-ann", "uid-bob", "gid-1"]),
        (vec!["doc", "parent", "root"], vec!["uid-ann", "uid-bob"]),
    ];
    for (resources, assignees) in cases {
        let acls = [acl("a", "r-reader", vec![users_group(&assignees)], vec![rule(&resources, &[PermissionName::View])])];
        let map = build_resource_permission_map(ResourceType::Document, "doc", &acls).unwrap();
        assert_eq!(map.permissions.len(), resources.len() * assignees.len());
    }
}

#[test]
fn public_assignee_counts_once_per_resource() {
    let acls = [acl("p", "r-reader", vec![public_group()], vec![rule(&["doc", "parent"], &[PermissionName::View])])];
    let map = build_resource_permission_map(ResourceType::Document, "doc", &acls).unwrap();
    assert_eq!(map.permissions.len(), 2);
    assert!(map.permissions.iter().all(|p| p.assignee_id.is_none()));
}

#[test]
fn only_the_winning_rule_is_flattened() {
    let acls = [acl(
        "a",
        "r-editor",
        vec![users_group(&["uid-ann"])],
        vec![rule(&["x", "y", "z"], &[PermissionName::View]), rule(&["doc"], &[PermissionName::Edit])],
    )];
    let map = build_resource_permission_map(ResourceType::Document, "doc", &acls).unwrap();
    assert_eq!(map.permissions.len(), 1);
    assert_eq!(map.permissions[0].permission, Some(PermissionName::Edit));
}

#[test]
fn acl_without_rules_is_an_error() {
    let broken = acl("broken", "r-reader", vec![users_group(&["uid-ann"])], vec![]);
    assert!(pick_rule_from_acl(&broken).is_err());
    let err = build_resource_permission_map(ResourceType::Document, "doc", &[broken]).unwrap_err();
    assert!(matches!(err, AccessError::AclWithoutRules { .. }));
}

#[test]
fn higher_score_wins_regardless_of_order() {
    // Edit scores 3, Delete scores 5
    let edit = rule(&["edit-target"], &[PermissionName::Edit]);
    let delete = rule(&["delete-target"], &[PermissionName::Delete]);
    assert_eq!(rule_score(&edit), 3);
    assert_eq!(rule_score(&delete), 5);

    for rules in [vec![edit.clone(), delete.clone()], vec![delete.clone(), edit.clone()]] {
        let a = acl("a", "r", vec![users_group(&["uid-ann"])], rules);
        assert_eq!(pick_rule_from_acl(&a).unwrap().resource.ids, ids(&["delete-target"]));
    }
}

// ============================================================================
// Permission flags
// ============================================================================

#[test]
fn unrestricted_edit_yields_no_synthesized_flags() {
    let maps = vec![document_group(PermissionName::Edit, &["x"], "1")];
    let flags = calculate_permission_flags(&breadcrumbs(&["root", "x"]), &maps, &[]);
    assert_eq!(flags, vec![PermissionFlag::unrestricted(PermissionName::Edit)]);
}

#[test]
fn restricted_edit_synthesizes_publish_and_review() {
    let maps = vec![document_group(PermissionName::Edit, &["x"], "1-in-langCodes-fr,nl")];
    let flags = calculate_permission_flags(&breadcrumbs(&["root", "x"]), &maps, &[]);
    let langs = ids(&["fr", "nl"]);
    assert_eq!(
        flags,
        vec![
            PermissionFlag::restricted(PermissionName::Edit, langs.clone()),
            PermissionFlag::restricted(PermissionName::Publish, langs.clone()),
            PermissionFlag::restricted(PermissionName::Review, langs),
        ]
    );
}

#[test]
fn extra_ids_match_without_breadcrumbs() {
    let maps = vec![document_group(PermissionName::View, &["a", "b"], "1")];
    let flags = calculate_permission_flags(&[], &maps, &ids(&["b"]));
    assert_eq!(flags, vec![PermissionFlag::unrestricted(PermissionName::View)]);
    assert!(calculate_permission_flags(&[], &maps, &ids(&["c"])).is_empty());
}

#[test]
fn restricted_flags_answer_language_queries() {
    let maps = vec![
        document_group(PermissionName::View, &["x"], "1"),
        document_group(PermissionName::Edit, &["x"], "1-in-langCodes-fr"),
    ];
    let flags = calculate_permission_flags(&breadcrumbs(&["x"]), &maps, &[]);
    let publish = [PermissionName::Publish];
    assert!(flags_contain_permissions(&flags, &publish, FlagQuery { language_code: Some("fr"), ..Default::default() }));
    assert!(!flags_contain_permissions(&flags, &publish, FlagQuery { language_code: Some("de"), ..Default::default() }));
    assert_eq!(permissions_for_language_code(&flags, "de"), vec![PermissionName::View]);
    assert!(!check_has_full_permission_anywhere(&maps, PermissionName::Edit));
}

// ============================================================================
// Access table
// ============================================================================

fn access_table(acls: &[Acl]) -> Vec<AccessDataAssignee> {
    let map = build_resource_permission_map(ResourceType::Document, "doc", acls).unwrap();
    build_access_data_assignees(&map.permissions, "doc", &users(), &[], &account_roles(), Removal::Hard)
}

#[test]
fn direct_edit_replaces_inherited_view() {
    let rows = access_table(&[
        acl("direct", "r-editor", vec![users_group(&["uid-ann"])], vec![rule(&["doc"], &[PermissionName::Edit])]),
        acl("inherited", "r-reader", vec![users_group(&["uid-ann"])], vec![rule(&["parent"], &[PermissionName::View])]),
    ]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].acl_id, "direct");
    assert_eq!(rows[0].role_name, "Editor");
    assert!(!rows[0].is_inherited_acl);
}

#[test]
fn pending_direct_removal_leaves_the_inherited_row() {
    let acls = [
        acl("direct", "r-editor", vec![users_group(&["uid-ann"])], vec![rule(&["doc"], &[PermissionName::Edit])]),
        acl("inherited", "r-reader", vec![users_group(&["uid-ann"])], vec![rule(&["parent"], &[PermissionName::View])]),
    ];
    let map = build_resource_permission_map(ResourceType::Document, "doc", &acls).unwrap();
    let rows = build_access_data_assignees(
        &map.permissions,
        "doc",
        &users(),
        &[],
        &account_roles(),
        Removal::Soft(Some("uid-ann")),
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].acl_id, "inherited");
    assert!(rows[0].is_inherited_acl);
}

#[test]
fn unknown_role_yields_empty_table() {
    init_tracing();
    let rows = access_table(&[
        acl("ok-1", "r-reader", vec![users_group(&["uid-ann"])], vec![rule(&["doc"], &[PermissionName::View])]),
        acl("bad", "r-gone", vec![users_group(&["uid-bob"])], vec![rule(&["doc"], &[PermissionName::View])]),
        acl("ok-2", "r-editor", vec![users_group(&["uid-bob"])], vec![rule(&["doc"], &[PermissionName::Edit])]),
    ]);
    assert!(rows.is_empty());
}

#[test]
fn public_grants_stay_out_of_the_table() {
    let rows = access_table(&[
        acl("p", "r-reader", vec![public_group()], vec![rule(&["doc"], &[PermissionName::View])]),
        acl("a", "r-admin", vec![users_group(&["uid-bob"])], vec![rule(&["root"], &[PermissionName::Admin])]),
    ]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "Bob");
    assert!(rows[0].is_inherited_acl);
    assert!(is_publicly_readable("doc", &[acl("p", "r-reader", vec![public_group()], vec![rule(&["doc"], &[PermissionName::View])])]).unwrap());
}

#[test]
fn translator_rows_carry_restricted_keys() {
    let mut translator = acl("t", "r-editor", vec![users_group(&["uid-ann"])], vec![rule(&["doc"], &[PermissionName::Edit])]);
    translator.restriction_set = Some(AclRestrictionSet::languages(["fr", "nl"]));
    let rows = access_table(&[translator]);
    assert_eq!(rows[0].acl_key, "Editor-in-langCodes-fr,nl");
    assert_eq!(direct_acls_by_key(&rows).get("Editor-in-langCodes-fr,nl"), Some(&"t"));
}
