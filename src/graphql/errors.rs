use async_graphql::{Error, ErrorExtensions};

use crate::errors::{AuthError, CoreError};

/// Map a core error to a GraphQL error carrying a `code` extension
pub fn core_error_to_graphql_error(err: CoreError) -> Error {
    let code = err.kind().code();
    let fields = err.fields().cloned();
    Error::new(err.message()).extend_with(|_, e| {
        e.set("code", code);
        if let Some(fields) = &fields {
            for (key, value) in fields {
                e.set(key.as_str(), value.as_str());
            }
        }
    })
}

pub fn auth_error_to_graphql_error(err: AuthError) -> Error {
    let code = err.error_code();
    Error::new(err.to_string()).extend_with(|_, e| e.set("code", code))
}
