//! String keys that carry a grant's language restriction.
//!
//! Both key kinds have the shape `<base>` or `<base>-in-langCodes-<c1>,<c2>,...`:
//! - resource-group key: base is the numeric resource type (`"1"`, `"1-in-langCodes-fr"`)
//! - ACL key: base is the role name (`"Contributor-in-langCodes-fr,nl"`)
//!
//! An empty language list encodes as the bare base.

use crate::constants::{LANG_CODES_MARKER, LANG_CODES_SEPARATOR};
use crate::error::{AccessError, Result};
use crate::model::{AclRestrictionSet, ResourceGroup, ResourceType};

fn build_key(base: &str, restriction: Option<&AclRestrictionSet>) -> String {
    match restriction.and_then(|r| r.restricted_languages()) {
        Some(codes) => {
            let sep = LANG_CODES_SEPARATOR.to_string();
            format!("{}{}{}", base, LANG_CODES_MARKER, codes.join(&sep))
        }
        None => base.to_string(),
    }
}

/// Split a key into its base and restricted language codes
pub fn parse_key(key: &str) -> (&str, Option<Vec<String>>) {
    match key.split_once(LANG_CODES_MARKER) {
        Some((base, codes)) => {
            let codes: Vec<String> = codes
                .split(LANG_CODES_SEPARATOR)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
            (base, if codes.is_empty() { None } else { Some(codes) })
        }
        None => (key, None),
    }
}

/// Key identifying "the ACL for this role with these restrictions" on one document
pub fn build_acl_key(role_name: &str, restriction: Option<&AclRestrictionSet>) -> String {
    build_key(role_name, restriction)
}

/// Key the authorization service attaches to each of a user's resource groups
pub fn build_resource_group_key(resource_type: ResourceType, restriction: Option<&AclRestrictionSet>) -> String {
    build_key(&u8::from(resource_type).to_string(), restriction)
}

/// Resource type encoded at the start of a resource-group key
pub fn resource_type_from_key(key: &str) -> Result<ResourceType> {
    let (base, _) = parse_key(key);
    let raw: u8 = base
        .parse()
        .map_err(|_| AccessError::InvalidKey(format!("bad resource type in {:?}", key)))?;
    ResourceType::try_from(raw).map_err(AccessError::InvalidKey)
}

/// Language codes encoded in a resource-group key, `None` when unrestricted
pub fn extract_languages_from_resource_group_key(key: Option<&str>) -> Option<Vec<String>> {
    key.and_then(|k| parse_key(k).1)
}

/// True when the group was granted through a language-restricted ACL
pub fn is_restricted_resource_group(group: &ResourceGroup) -> bool {
    extract_languages_from_resource_group_key(group.resource_group_key.as_deref()).is_some()
}
