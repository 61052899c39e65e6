use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StudyMate API",
        version = "1.0.0",
        description = "Study-partner matching backend.\n\n**Features:**\n- User registration\n- Partner profiles: create, list, search, rank, update\n- Connections between users and partners\n- Health monitoring"
    ),
    paths(
        // Health
        crate::api::health::root,
        crate::api::health::health_check,

        // Users
        crate::api::users::create_user,

        // Partners
        crate::api::partners::create_partner,
        crate::api::partners::all_partners,
        crate::api::partners::recent_partners,
        crate::api::partners::top_partners,
        crate::api::partners::get_partner,
        crate::api::partners::search_partners,
        crate::api::partners::sort_partners,
        crate::api::partners::update_partner,
        crate::api::partners::increment_partner_count,

        // Connections
        crate::api::connections::list_connections,
        crate::api::connections::connect,
        crate::api::connections::delete_connection,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::models::InsertAck,
            crate::models::UpdateAck,
            crate::models::DeleteAck,
            crate::models::PartnerDetailsUpdate,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and database connectivity."),
        (name = "Users", description = "User registration. Emails are unique."),
        (name = "Partners", description = "Partner profiles: creation, listing, search, experience sort and counters."),
        (name = "Connections", description = "Links between a user email and a partner. Each (email, partner_id) pair is unique."),
    )
)]
pub struct ApiDoc;
