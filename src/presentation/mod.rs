// Presentation layer - HTTP JSON API for the dashboard
pub mod app_state;
pub mod handlers;
pub mod routes;
