pub mod connection_service;
pub mod partner_service;
pub mod user_service;
