//! Layered override merge for declarative configuration documents.
//!
//! Overlay values replace only the keys they explicitly specify; everything
//! else keeps the base layer's value. Arrays are replaced entirely, never
//! concatenated.

use serde_json::Value;

/// Merge `overlay` onto `base`, with the overlay taking precedence.
///
/// - Objects merge recursively: overlay keys override base keys
/// - Scalars and arrays are replaced entirely
/// - An overlay null means "not specified" and preserves the base value
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}
