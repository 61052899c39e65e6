use actix_web::{http::header, web, HttpRequest, HttpResponse, ResponseError};
use mongodb::bson::Document;

use crate::{
    database::StudyStore,
    models::{ExperienceSortQuery, InsertAck, PartnerDetailsUpdate, SearchQuery, UpdateAck},
    services::partner_service,
    utils::{document_to_json, documents_to_json, AppError},
};

fn partner_list(result: Result<Vec<Document>, AppError>, route: &str) -> HttpResponse {
    match result {
        Ok(partners) => {
            log::info!("✅ {} - {} partners", route, partners.len());
            HttpResponse::Ok().json(documents_to_json(partners))
        }
        Err(e) => {
            log::error!("❌ {} failed: {}", route, e);
            e.error_response()
        }
    }
}

/// POST /create/partner - Cria perfil de parceiro
///
/// Body: partner profile document.
#[utoipa::path(
    post,
    path = "/create/partner",
    tag = "Partners",
    request_body(content = Object, content_type = "application/json", description = "Partner profile, stored as sent"),
    responses(
        (status = 200, description = "`{message, result}` with the insert acknowledgement", body = InsertAck),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_partner(
    req: HttpRequest,
    db: web::Data<dyn StudyStore>,
    body: web::Json<Document>,
) -> HttpResponse {
    let has_auth = req.headers().contains_key(header::AUTHORIZATION);
    log::info!("📝 POST /create/partner (authorization header: {})", has_auth);

    match partner_service::create_partner(db.get_ref(), body.into_inner()).await {
        Ok(result) => {
            log::info!("✅ Partner created: {}", result.inserted_id);
            HttpResponse::Ok().json(serde_json::json!({
                "message": "Partner created successfully",
                "result": result
            }))
        }
        Err(e) => {
            log::error!("❌ Error creating partner: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Internal server error"
            }))
        }
    }
}

/// GET /all-partners - Todos os parceiros, sem filtro
#[utoipa::path(
    get,
    path = "/all-partners",
    tag = "Partners",
    responses(
        (status = 200, description = "Every partner profile"),
        (status = 500, description = "Database error")
    )
)]
pub async fn all_partners(db: web::Data<dyn StudyStore>) -> HttpResponse {
    log::info!("📋 GET /all-partners");
    partner_list(partner_service::all_partners(db.get_ref()).await, "GET /all-partners")
}

/// GET /partners/recent - Cinco parceiros mais recentes
#[utoipa::path(
    get,
    path = "/partners/recent",
    tag = "Partners",
    responses(
        (status = 200, description = "Up to 5 newest partner profiles"),
        (status = 500, description = "Database error")
    )
)]
pub async fn recent_partners(db: web::Data<dyn StudyStore>) -> HttpResponse {
    log::info!("📋 GET /partners/recent");
    partner_list(partner_service::recent_partners(db.get_ref()).await, "GET /partners/recent")
}

/// GET /topPartners - Seis parceiros com maior rating
#[utoipa::path(
    get,
    path = "/topPartners",
    tag = "Partners",
    responses(
        (status = 200, description = "Up to 6 partner profiles by rating, highest first"),
        (status = 500, description = "Database error")
    )
)]
pub async fn top_partners(db: web::Data<dyn StudyStore>) -> HttpResponse {
    log::info!("🏆 GET /topPartners");
    partner_list(partner_service::top_partners(db.get_ref()).await, "GET /topPartners")
}

#[utoipa::path(
    get,
    path = "/partner/{id}",
    tag = "Partners",
    params(("id" = String, Path, description = "Partner ObjectId")),
    responses(
        (status = 200, description = "The partner profile"),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Partner not found"),
        (status = 500, description = "Database error")
    )
)]
pub async fn get_partner(
    db: web::Data<dyn StudyStore>,
    id: web::Path<String>,
) -> HttpResponse {
    log::info!("🔎 GET /partner/{}", id);

    match partner_service::get_partner(db.get_ref(), &id).await {
        Ok(partner) => HttpResponse::Ok().json(document_to_json(partner)),
        Err(e @ AppError::NotFound(_)) => {
            log::warn!("⚠️ Partner {} not found", id);
            e.error_response()
        }
        Err(e) => {
            log::error!("❌ Error fetching partner {}: {}", id, e);
            e.error_response()
        }
    }
}

/// GET /partners?search= - Busca por matéria (case-insensitive)
#[utoipa::path(
    get,
    path = "/partners",
    tag = "Partners",
    params(SearchQuery),
    responses(
        (status = 200, description = "Partners whose subject contains the search text"),
        (status = 500, description = "Database error")
    )
)]
pub async fn search_partners(
    db: web::Data<dyn StudyStore>,
    query: web::Query<SearchQuery>,
) -> HttpResponse {
    log::info!("🔍 GET /partners?search={}", query.search.as_deref().unwrap_or(""));
    partner_list(
        partner_service::search_partners(db.get_ref(), query.search.as_deref()).await,
        "GET /partners",
    )
}

/// GET /partners/sort?expSort= - Ordena por nível de experiência
#[utoipa::path(
    get,
    path = "/partners/sort",
    tag = "Partners",
    params(ExperienceSortQuery),
    responses(
        (status = 200, description = "All partners ordered by experience priority"),
        (status = 500, description = "Database error")
    )
)]
pub async fn sort_partners(
    db: web::Data<dyn StudyStore>,
    query: web::Query<ExperienceSortQuery>,
) -> HttpResponse {
    log::info!("📊 GET /partners/sort?expSort={}", query.exp_sort.as_deref().unwrap_or(""));
    partner_list(
        partner_service::sort_by_experience(db.get_ref(), query.exp_sort.as_deref()).await,
        "GET /partners/sort",
    )
}

/// PATCH /partner/update/{id} - Atualiza dados públicos do parceiro
#[utoipa::path(
    patch,
    path = "/partner/update/{id}",
    tag = "Partners",
    params(("id" = String, Path, description = "Partner ObjectId")),
    request_body = PartnerDetailsUpdate,
    responses(
        (status = 200, description = "Update acknowledgement", body = UpdateAck),
        (status = 400, description = "Malformed id or nothing to update"),
        (status = 500, description = "Database error")
    )
)]
pub async fn update_partner(
    db: web::Data<dyn StudyStore>,
    id: web::Path<String>,
    body: web::Json<PartnerDetailsUpdate>,
) -> HttpResponse {
    log::info!("🔧 PATCH /partner/update/{}", id);

    match partner_service::update_details(db.get_ref(), &id, &body).await {
        Ok(ack) => {
            log::info!("✅ Partner {} updated (matched {})", id, ack.matched_count);
            HttpResponse::Ok().json(ack)
        }
        Err(e) => {
            log::error!("❌ Error updating partner {}: {}", id, e);
            e.error_response()
        }
    }
}

/// PATCH /Inc/{id} - Incrementa partnerCount
#[utoipa::path(
    patch,
    path = "/Inc/{id}",
    tag = "Partners",
    params(("id" = String, Path, description = "Partner ObjectId")),
    responses(
        (status = 200, description = "Update acknowledgement", body = UpdateAck),
        (status = 400, description = "Malformed id"),
        (status = 500, description = "Database error")
    )
)]
pub async fn increment_partner_count(
    db: web::Data<dyn StudyStore>,
    id: web::Path<String>,
) -> HttpResponse {
    log::info!("➕ PATCH /Inc/{}", id);

    match partner_service::increment_partner_count(db.get_ref(), &id).await {
        Ok(ack) => HttpResponse::Ok().json(ack),
        Err(e) => {
            log::error!("❌ Error incrementing partner {}: {}", id, e);
            e.error_response()
        }
    }
}
