pub mod ack;
pub mod connection;
pub mod partner;
pub mod user;

pub use ack::*;
pub use connection::*;
pub use partner::*;
pub use user::*;

use mongodb::bson::Document;

use crate::utils::AppError;

/// Conditional inserts go through `$setOnInsert`, where a dotted name is a
/// path and a `$` prefix is an operator. Such names are refused up front so
/// the stored document always has the field names the client sent.
pub fn check_field_names(document: &Document) -> Result<(), AppError> {
    match document
        .keys()
        .find(|key| key.is_empty() || key.contains('.') || key.starts_with('$'))
    {
        Some(key) => Err(AppError::InvalidRequest(format!(
            "field name '{}' may not be empty, contain '.' or start with '$'",
            key
        ))),
        None => Ok(()),
    }
}
