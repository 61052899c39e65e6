pub mod connections;
pub mod health;
pub mod partners;
pub mod swagger;
pub mod users;


use actix_web::{error::InternalError, web, HttpResponse};

/// Malformed JSON bodies get the same `{message, error}` shape as other failures.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid JSON body",
            "error": err.to_string()
        }));
        InternalError::from_response(err, response).into()
    })
}

/// Route table shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        // Health
        .route("/", web::get().to(health::root))
        .route("/health", web::get().to(health::health_check))
        // Users
        .route("/create/user", web::post().to(users::create_user))
        // Partners
        .route("/create/partner", web::post().to(partners::create_partner))
        .route("/all-partners", web::get().to(partners::all_partners))
        .route("/partners/recent", web::get().to(partners::recent_partners))
        .route("/partners/sort", web::get().to(partners::sort_partners))
        .route("/partners", web::get().to(partners::search_partners))
        .route("/topPartners", web::get().to(partners::top_partners))
        .route("/partner/update/{id}", web::patch().to(partners::update_partner))
        .route("/Inc/{id}", web::patch().to(partners::increment_partner_count))
        // Connections
        .route("/partner/connect", web::post().to(connections::connect))
        .route("/partner/connected/{email}", web::get().to(connections::list_connections))
        .route("/partner/delete/{id}", web::delete().to(connections::delete_connection))
        // Catch-all de /partner/{id} deve ficar por último
        .route("/partner/{id}", web::get().to(partners::get_partner));
}
