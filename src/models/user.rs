use mongodb::bson::{Bson, Document};

use super::check_field_names;
use crate::utils::AppError;

/// A user registration. Only `email` is interpreted; every other field is
/// stored as submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub profile: Document,
}

impl NewUser {
    pub fn from_document(mut profile: Document) -> Result<Self, AppError> {
        profile.remove("_id");
        check_field_names(&profile)?;

        let email = match profile.get("email") {
            Some(Bson::String(email)) if !email.trim().is_empty() => email.clone(),
            _ => return Err(AppError::InvalidRequest("email is required".to_string())),
        };

        Ok(Self { email, profile })
    }
}
