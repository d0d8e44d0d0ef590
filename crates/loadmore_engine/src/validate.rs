use serde_json::Value;

use crate::{ContractViolation, ItemFragment};

/// Validates a page body of the shape `[{"html": "<li>..</li>"}, ...]`.
///
/// The whole body is rejected if any element is off-shape; extra fields on
/// an element are ignored.
pub fn parse_page_body(body: &[u8]) -> Result<Vec<ItemFragment>, ContractViolation> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| ContractViolation::InvalidJson(err.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ContractViolation::NotAnArray {
                found: json_kind(&other),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(mut fields) => match fields.remove("html") {
                Some(Value::String(html)) => Ok(ItemFragment { html }),
                _ => Err(ContractViolation::MissingHtml { index }),
            },
            _ => Err(ContractViolation::MissingHtml { index }),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
