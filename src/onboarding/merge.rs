//! JSON merge used by draft saves.

use serde_json::Value;

/// Top-level keys the server owns. They are dropped from incoming patches.
pub const SERVER_OWNED_KEYS: &[&str] = &["derived", "status", "committed_at"];

/// Recursively merge `patch` into `target`.
///
/// Objects merge key by key. Any other value in the patch (string, number,
/// list, null) replaces the target value wholesale.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                let nested =
                    patch_value.is_object() && target_map.get(key).is_some_and(Value::is_object);
                match target_map.get_mut(key) {
                    Some(existing) if nested => deep_merge(existing, patch_value),
                    _ => {
                        target_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Remove server-owned top-level keys from a patch object.
pub fn strip_server_owned(patch: &mut Value) {
    if let Some(map) = patch.as_object_mut() {
        for key in SERVER_OWNED_KEYS {
            map.remove(*key);
        }
    }
}
