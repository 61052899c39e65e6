use mongodb::bson::Document;

use crate::{
    database::StudyStore,
    models::{DeleteAck, InsertOutcome, NewConnection},
    utils::{parse_object_id, AppError},
};

pub async fn connect(db: &dyn StudyStore, body: Document) -> Result<InsertOutcome, AppError> {
    let connection = NewConnection::from_document(body)?;
    log::info!(
        "🤝 Connecting {} with partner {}",
        connection.email,
        connection.partner_id
    );
    db.insert_connection_if_absent(connection).await
}

pub async fn list_connections(db: &dyn StudyStore, email: &str) -> Result<Vec<Document>, AppError> {
    db.find_connections(email).await
}

/// Deleting an unknown id is not an error; the ack reports zero deletions.
pub async fn delete_connection(db: &dyn StudyStore, id: &str) -> Result<DeleteAck, AppError> {
    let id = parse_object_id(id)?;
    db.delete_connection(id).await
}
