//! HTTP API handlers for anidex-api

pub mod animal;
pub mod auth;
pub mod health;

pub use animal::create_animal;
pub use auth::auth_middleware;
pub use health::health_routes;
