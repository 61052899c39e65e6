use actix_web::{web, HttpResponse, ResponseError};
use mongodb::bson::Document;

use crate::{
    database::StudyStore,
    models::{InsertAck, InsertOutcome},
    services::user_service,
};

/// POST /create/user - Registra usuário se o email ainda não existir
///
/// Body: user document, `email` obrigatório.
#[utoipa::path(
    post,
    path = "/create/user",
    tag = "Users",
    request_body(content = Object, content_type = "application/json", description = "User profile; `email` is required"),
    responses(
        (status = 200, description = "Inserted, or `{message: \"Already exist\"}`", body = InsertAck),
        (status = 400, description = "Missing email or invalid field name"),
        (status = 500, description = "Database error")
    )
)]
pub async fn create_user(
    db: web::Data<dyn StudyStore>,
    body: web::Json<Document>,
) -> HttpResponse {
    log::info!("📝 POST /create/user");

    match user_service::register_user(db.get_ref(), body.into_inner()).await {
        Ok(InsertOutcome::Inserted(ack)) => {
            log::info!("✅ User created: {}", ack.inserted_id);
            HttpResponse::Ok().json(ack)
        }
        Ok(InsertOutcome::AlreadyExists) => {
            HttpResponse::Ok().json(serde_json::json!({ "message": "Already exist" }))
        }
        Err(e) => {
            log::error!("❌ Error creating user: {}", e);
            e.error_response()
        }
    }
}
