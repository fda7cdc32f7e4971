//! Update patches over JSON documents
//!
//! A patch mirrors the shape of the document it updates. Object keys (or array
//! indices as strings) descend; at any level these commands apply:
//! - `{"$set": v}`: replace the value
//! - `{"$merge": {..}}`: shallow-merge into an object
//! - `{"$splice": [[index, deleteCount, items...], ...]}`: edit an array in order
//!
//! Applying never mutates the input; a new value is returned.

use serde_json::{Map, Value};

use crate::error::{AccessError, Result};

fn invalid(msg: impl Into<String>) -> AccessError {
    AccessError::InvalidPatch(msg.into())
}

/// Deep merge where `left` wins on conflicting leaves
fn merge_deep_left(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            let mut out = r.clone();
            for (k, lv) in l {
                let merged = match r.get(k) {
                    Some(rv) => merge_deep_left(lv, rv),
                    None => lv.clone(),
                };
                out.insert(k.clone(), merged);
            }
            Value::Object(out)
        }
        _ => left.clone(),
    }
}

/// Merge patches into one; earlier patches win where they touch the same leaf
pub fn merge_patches(patches: &[Value]) -> Value {
    patches
        .iter()
        .fold(Value::Object(Map::new()), |acc, p| merge_deep_left(&acc, p))
}

/// Apply a patch to a document, returning the updated copy
pub fn apply_patch(target: &Value, patch: &Value) -> Result<Value> {
    let commands = patch
        .as_object()
        .ok_or_else(|| invalid(format!("patch must be an object, got {}", patch)))?;

    let mut current = target.clone();
    for (key, value) in commands.iter().filter(|(k, _)| k.starts_with('$')) {
        current = match key.as_str() {
            "$set" => value.clone(),
            "$merge" => apply_merge(&current, value)?,
            "$splice" => apply_splice(&current, value)?,
            other => return Err(invalid(format!("unsupported command {}", other))),
        };
    }

    for (key, sub) in commands.iter().filter(|(k, _)| !k.starts_with('$')) {
        if current.is_null() {
            current = Value::Object(Map::new());
        }
        match &mut current {
            Value::Object(map) => {
                let child = map.get(key).cloned().unwrap_or(Value::Null);
                map.insert(key.clone(), apply_patch(&child, sub)?);
            }
            Value::Array(items) => {
                let index: usize = key.parse().map_err(|_| invalid(format!("bad array index {:?}", key)))?;
                let child = items
                    .get(index)
                    .ok_or_else(|| invalid(format!("index {} out of bounds ({})", index, items.len())))?;
                let updated = apply_patch(child, sub)?;
                items[index] = updated;
            }
            other => return Err(invalid(format!("cannot descend into {} with {:?}", other, key))),
        }
    }
    Ok(current)
}

fn apply_merge(target: &Value, value: &Value) -> Result<Value> {
    let additions = value.as_object().ok_or_else(|| invalid("$merge needs an object"))?;
    let mut out = match target {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        _ => return Err(invalid("$merge target is not an object")),
    };
    for (k, v) in additions {
        out.insert(k.clone(), v.clone());
    }
    Ok(Value::Object(out))
}

fn apply_splice(target: &Value, value: &Value) -> Result<Value> {
    let mut items = target
        .as_array()
        .cloned()
        .ok_or_else(|| invalid("$splice target is not an array"))?;
    let ops = value.as_array().ok_or_else(|| invalid("$splice needs a list of operations"))?;
    for op in ops {
        let args = op.as_array().ok_or_else(|| invalid("splice operation must be a list"))?;
        let index = args
            .first()
            .and_then(Value::as_u64)
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| invalid("splice index missing"))?;
        if index > items.len() {
            return Err(invalid(format!("splice index {} beyond length {}", index, items.len())));
        }
        let delete = args
            .get(1)
            .and_then(Value::as_u64)
            .map_or(0, |d| usize::try_from(d).unwrap_or(usize::MAX));
        let end = index.saturating_add(delete).min(items.len());
        items.splice(index..end, args.iter().skip(2).cloned());
    }
    Ok(Value::Array(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_set_and_merge() {
        let doc = json!({ "a": { "b": 1, "c": [1, 2] }, "keep": true });
        let patch = json!({ "a": { "b": { "$set": 5 }, "c": { "1": { "$set": 9 } } } });
        let out = apply_patch(&doc, &patch).unwrap();
        assert_eq!(out, json!({ "a": { "b": 5, "c": [1, 9] }, "keep": true }));
        assert_eq!(doc["a"]["b"], 1);

        let merged = apply_patch(&json!({ "x": 1 }), &json!({ "$merge": { "y": 2 } })).unwrap();
        assert_eq!(merged, json!({ "x": 1, "y": 2 }));
    }

    #[test]
    fn splices_apply_in_order() {
        let out = apply_patch(&json!([1, 2, 3]), &json!({ "$splice": [[0, 1], [1, 0, "x"]] })).unwrap();
        assert_eq!(out, json!([2, "x", 3]));
    }

    #[test]
    fn oversized_delete_count_truncates() {
        let out = apply_patch(&json!([1, 2, 3]), &json!({ "$splice": [[1, u64::MAX]] })).unwrap();
        assert_eq!(out, json!([1]));

        let out = apply_patch(&json!([1, 2, 3]), &json!({ "$splice": [[3, u64::MAX, "x"]] })).unwrap();
        assert_eq!(out, json!([1, 2, 3, "x"]));

        assert!(apply_patch(&json!([1]), &json!({ "$splice": [[u64::MAX, 0]] })).is_err());
    }

    #[test]
    fn bad_targets_are_errors() {
        assert!(apply_patch(&json!([1]), &json!({ "$splice": [[3, 0, 1]] })).is_err());
        assert!(apply_patch(&json!([1]), &json!({ "4": { "$set": 1 } })).is_err());
        assert!(apply_patch(&json!(1), &json!({ "$merge": {} })).is_err());
        assert!(apply_patch(&json!({}), &json!({ "$push": [1] })).is_err());
        assert!(apply_patch(&json!({}), &json!(3)).is_err());
    }

    #[test]
    fn earlier_patch_wins_on_merge() {
        let merged = merge_patches(&[
            json!({ "m": { "0": { "$set": "first" } } }),
            json!({ "m": { "0": { "$set": "second" }, "1": { "$set": "other" } } }),
        ]);
        assert_eq!(merged, json!({ "m": { "0": { "$set": "first" }, "1": { "$set": "other" } } }));
    }
}
