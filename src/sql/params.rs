//! Convert serde_json::Value to the text form bound to a `$n::type` placeholder.

use serde_json::Value;

/// Text representation PostgreSQL parses into the cast target type. `None` binds NULL.
/// Arrays and objects never reach here: the store rejects them before building SQL.
pub fn to_bind_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => Some(v.to_string()),
    }
}
