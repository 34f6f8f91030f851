pub mod cerebras;
pub mod models;
pub mod routes;
