use actix_web::{web, HttpResponse, ResponseError};
use mongodb::bson::Document;

use crate::{
    database::StudyStore,
    models::{DeleteAck, InsertAck, InsertOutcome},
    services::connection_service,
    utils::documents_to_json,
};

/// GET /partner/connected/{email} - Lista conexões do usuário
#[utoipa::path(
    get,
    path = "/partner/connected/{email}",
    tag = "Connections",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "Connections of this user"),
        (status = 500, description = "Database error")
    )
)]
pub async fn list_connections(
    db: web::Data<dyn StudyStore>,
    email: web::Path<String>,
) -> HttpResponse {
    log::info!("📋 GET /partner/connected/{}", email);

    match connection_service::list_connections(db.get_ref(), &email).await {
        Ok(connections) => {
            log::info!("✅ Listed {} connections", connections.len());
            HttpResponse::Ok().json(documents_to_json(connections))
        }
        Err(e) => {
            log::error!("❌ Error listing connections: {}", e);
            e.error_response()
        }
    }
}

/// POST /partner/connect - Conecta usuário a um parceiro
///
/// Body: connection document, `email` e `partner_id` obrigatórios.
#[utoipa::path(
    post,
    path = "/partner/connect",
    tag = "Connections",
    request_body(content = Object, content_type = "application/json", description = "Connection; `email` and `partner_id` are required"),
    responses(
        (status = 200, description = "Inserted, or `{message: \"Already exist\"}`", body = InsertAck),
        (status = 400, description = "Missing email, invalid partner_id or field name"),
        (status = 500, description = "Database error")
    )
)]
pub async fn connect(
    db: web::Data<dyn StudyStore>,
    body: web::Json<Document>,
) -> HttpResponse {
    log::info!("🤝 POST /partner/connect");

    match connection_service::connect(db.get_ref(), body.into_inner()).await {
        Ok(InsertOutcome::Inserted(ack)) => {
            log::info!("✅ Connection created: {}", ack.inserted_id);
            HttpResponse::Ok().json(ack)
        }
        Ok(InsertOutcome::AlreadyExists) => {
            log::warn!("⚠️ Connection already exists");
            HttpResponse::Ok().json(serde_json::json!({ "message": "Already exist" }))
        }
        Err(e) => {
            log::error!("❌ Error creating connection: {}", e);
            e.error_response()
        }
    }
}

/// DELETE /partner/delete/{id} - Remove conexão
#[utoipa::path(
    delete,
    path = "/partner/delete/{id}",
    tag = "Connections",
    params(("id" = String, Path, description = "Connection ObjectId")),
    responses(
        (status = 200, description = "Delete acknowledgement, `deletedCount` 0 if unknown", body = DeleteAck),
        (status = 400, description = "Malformed id"),
        (status = 500, description = "Database error")
    )
)]
pub async fn delete_connection(
    db: web::Data<dyn StudyStore>,
    id: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️  DELETE /partner/delete/{}", id);

    match connection_service::delete_connection(db.get_ref(), &id).await {
        Ok(ack) => {
            log::info!("✅ Deleted {} connection(s)", ack.deleted_count);
            HttpResponse::Ok().json(ack)
        }
        Err(e) => {
            log::error!("❌ Error deleting connection {}: {}", id, e);
            e.error_response()
        }
    }
}
