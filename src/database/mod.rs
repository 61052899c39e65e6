pub mod mongo;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};

use crate::models::{
    DeleteAck, ExperienceLevel, InsertAck, InsertOutcome, NewConnection, NewUser, PartnerQuery,
    UpdateAck,
};
use crate::utils::AppError;

pub use mongo::MongoDB;

pub const USERS: &str = "users";
pub const PARTNERS: &str = "partners-profile";
pub const CONNECTIONS: &str = "partners-connection";

/// Persistence operations behind the HTTP routes.
///
/// Handlers receive this as `web::Data<dyn StudyStore>`, so the MongoDB
/// backend can be swapped for the in-memory one in tests.
#[async_trait]
pub trait StudyStore: Send + Sync {
    /// Round-trip to the server; used at startup and by `/health`.
    async fn ping(&self) -> Result<(), AppError>;

    /// Inserts the user unless one with the same email exists.
    async fn insert_user_if_absent(&self, user: NewUser) -> Result<InsertOutcome, AppError>;

    async fn insert_partner(&self, partner: Document) -> Result<InsertAck, AppError>;

    async fn find_partners(&self, query: PartnerQuery) -> Result<Vec<Document>, AppError>;

    async fn find_partner(&self, id: ObjectId) -> Result<Option<Document>, AppError>;

    /// All partners ordered by the position of `experienceLevel` in `priority`;
    /// values outside `priority` come first.
    async fn partners_by_experience(
        &self,
        priority: &[ExperienceLevel],
    ) -> Result<Vec<Document>, AppError>;

    /// Applies `set` as a `$set` on the partner.
    async fn update_partner(&self, id: ObjectId, set: Document) -> Result<UpdateAck, AppError>;

    async fn increment_partner_count(&self, id: ObjectId) -> Result<UpdateAck, AppError>;

    async fn find_connections(&self, email: &str) -> Result<Vec<Document>, AppError>;

    /// Inserts the connection unless the `(email, partner_id)` pair exists.
    async fn insert_connection_if_absent(
        &self,
        connection: NewConnection,
    ) -> Result<InsertOutcome, AppError>;

    async fn delete_connection(&self, id: ObjectId) -> Result<DeleteAck, AppError>;
}
