//! Structured error bodies returned by the API
//!
//! Three shapes are understood:
//! - flat: `{"code": "...", "message": "...", "details": ...}`
//! - wrapped: `{"error": {"code": ..., "message": ..., "details": ...}}`
//! - FastAPI: `{"detail": "..."}` or `{"detail": [{"loc": [...], "msg": "..."}]}`

use serde_json::Value;

/// Fields extracted from an error response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
}

impl ErrorBody {
    /// Parse a response body. Returns `None` for non-JSON bodies and for JSON
    /// that carries none of the known fields.
    pub fn parse(body: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(body).ok()?;
        let object = match value.get("error") {
            Some(inner @ Value::Object(_)) => inner,
            Some(Value::String(message)) => {
                return Some(Self { message: Some(message.clone()), ..Self::default() });
            }
            _ => &value,
        };

        let mut parsed = Self {
            code: object.get("code").and_then(scalar_to_string),
            message: object.get("message").and_then(Value::as_str).map(str::to_owned),
            details: object.get("details").and_then(details_to_string),
        };

        if parsed.message.is_none() {
            match object.get("detail") {
                Some(Value::String(detail)) => parsed.message = Some(detail.clone()),
                Some(Value::Array(items)) => {
                    let messages: Vec<String> = items.iter().filter_map(fastapi_item).collect();
                    if !messages.is_empty() {
                        parsed.message = Some(messages.join("; "));
                    }
                }
                _ => {}
            }
        }

        (parsed != Self::default()).then_some(parsed)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn details_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// `{"loc": ["body", "email"], "msg": "field required"}` -> "email: field required"
fn fastapi_item(item: &Value) -> Option<String> {
    let msg = item.get("msg").and_then(Value::as_str)?;
    let field = item
        .get("loc")
        .and_then(Value::as_array)
        .and_then(|loc| loc.last())
        .and_then(scalar_to_string);
    Some(match field {
        Some(field) => format!("{field}: {msg}"),
        None => msg.to_string(),
    })
}
