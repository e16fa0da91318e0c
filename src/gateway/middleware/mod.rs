// Middleware module - Axum layers shared by the whole router

pub mod cors;

pub use cors::cors_layer;
