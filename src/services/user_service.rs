use mongodb::bson::Document;

use crate::{
    database::StudyStore,
    models::{InsertOutcome, NewUser},
    utils::AppError,
};

/// Registers a user unless the email is already taken.
pub async fn register_user(db: &dyn StudyStore, body: Document) -> Result<InsertOutcome, AppError> {
    let user = NewUser::from_document(body)?;
    log::info!("📝 Registering user {}", user.email);

    let outcome = db.insert_user_if_absent(user).await?;
    if outcome == InsertOutcome::AlreadyExists {
        log::warn!("⚠️ User already registered");
    }
    Ok(outcome)
}
