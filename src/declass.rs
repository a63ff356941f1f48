//! Secret declassification: overlay externally sourced values onto the
//! scalar leaves of a loaded configuration document.
//!
//! The walk is depth-first, pre-order, over the document's JSON tree.
//! Object keys are the serde-declared field names — the same names used
//! for persistence — joined with `/` under a caller-supplied namespace
//! prefix, so secret paths are stable across reload. Only string and
//! integer leaves participate: a string takes the store's value
//! verbatim, an integer only when the value parses as base-10 `i64`.
//! Booleans, floats, and collections are left untouched, and a `null`
//! (an absent `Option` branch) terminates that branch silently.
//!
//! The pass is best-effort and cannot fail: a missing override, an
//! unparseable integer, or a store with nothing to say all degrade to
//! "keep the original value".

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::store::SecretStore;

/// Overlay secrets from `store` onto `document` in place.
///
/// `prefix` is the namespace root for every path the store is asked
/// about: a field `listen` at the top of the document is queried as
/// `{prefix}/listen`, a nested `vault.address` as
/// `{prefix}/vault/address`.
///
/// ```ignore
/// let mut config = ServiceConfig::default();
/// declassify(&mut config, "svc", &store);
/// ```
pub fn declassify<T>(document: &mut T, prefix: &str, store: &dyn SecretStore)
where
    T: Serialize + DeserializeOwned,
{
    let Ok(mut tree) = serde_json::to_value(&*document) else {
        return;
    };
    if !overlay(&mut tree, prefix, store) {
        return;
    }
    // Write back only when a leaf actually changed and the updated tree
    // still fits the document type; otherwise the pass is a no-op.
    if let Ok(updated) = serde_json::from_value(tree) {
        *document = updated;
    }
}

/// Recursive walk over the document tree. Returns whether any leaf changed.
pub(crate) fn overlay(value: &mut Value, path: &str, store: &dyn SecretStore) -> bool {
    if is_integer(value) {
        if let Some(secret) = store.get_secret(path)
            && let Ok(parsed) = secret.parse::<i64>()
        {
            *value = Value::Number(parsed.into());
            return true;
        }
        return false;
    }

    match value {
        Value::Object(fields) => {
            let mut changed = false;
            for (name, child) in fields.iter_mut() {
                let child_path = qualified(path, name);
                changed |= overlay(child, &child_path, store);
            }
            changed
        }
        Value::String(current) => {
            if let Some(secret) = store.get_secret(path) {
                *current = secret;
                true
            } else {
                false
            }
        }
        // Null ends an absent branch; booleans, floats, and collections
        // are not overridable.
        _ => false,
    }
}

fn is_integer(value: &Value) -> bool {
    matches!(value, Value::Number(n) if !n.is_f64())
}

/// Join a field name onto a path prefix.
fn qualified(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}
