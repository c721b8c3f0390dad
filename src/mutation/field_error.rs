use async_graphql::SimpleObject;
use serde::Serialize;

/// A validation or resolution failure attached to one input field.
///
/// Field errors are returned inside mutation payloads, never raised.
#[derive(SimpleObject, Clone, Debug, PartialEq, Eq, Serialize)]
#[graphql(name = "Error")]
pub struct FieldError {
    /// camelCase name of the offending field, or null for non-field errors
    pub field: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            field: field.map(snake_to_camel_case),
            message: message.into(),
        }
    }

    pub fn for_field(field: &str, message: impl Into<String>) -> Self {
        Self::new(Some(field), message)
    }

    pub fn non_field(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}

/// `is_active` -> `isActive`, `email` -> `email`
pub fn snake_to_camel_case(name: &str) -> String {
    let mut parts = name.split('_');
    let mut camel = parts.next().unwrap_or_default().to_lowercase();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            camel.extend(first.to_uppercase());
            camel.push_str(&chars.as_str().to_lowercase());
        }
    }
    camel
}
