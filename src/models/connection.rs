use mongodb::bson::{Bson, Document};

use super::check_field_names;
use crate::utils::AppError;

/// A link between a user (by email) and a partner profile. The pair
/// `(email, partner_id)` is unique.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConnection {
    pub email: String,
    pub partner_id: Bson,
    pub document: Document,
}

impl NewConnection {
    pub fn from_document(mut document: Document) -> Result<Self, AppError> {
        document.remove("_id");
        check_field_names(&document)?;

        let email = match document.get("email") {
            Some(Bson::String(email)) if !email.trim().is_empty() => email.clone(),
            _ => return Err(AppError::InvalidRequest("email is required".to_string())),
        };

        // Part of the upsert filter, so only plain values are allowed here.
        let partner_id = match document.get("partner_id") {
            None | Some(Bson::Null) => {
                return Err(AppError::InvalidRequest("partner_id is required".to_string()))
            }
            Some(Bson::String(id)) if !id.trim().is_empty() => Bson::String(id.clone()),
            Some(Bson::ObjectId(id)) => Bson::ObjectId(*id),
            Some(_) => {
                return Err(AppError::InvalidRequest(
                    "partner_id must be a string or ObjectId".to_string(),
                ))
            }
        };

        Ok(Self { email, partner_id, document })
    }
}
