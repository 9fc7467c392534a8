//! Recipe service: owner-scoped tags, ingredients and recipes with image
//! uploads

pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod storage;

pub use routes::create_router;
pub use state::AppState;
