//! Application state shared across handlers

use common::jwt::JwtService;
use sqlx::PgPool;

use crate::{rate_limiter::RateLimiter, repositories::UserRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(db_pool: PgPool, jwt_service: JwtService, rate_limiter: RateLimiter) -> Self {
        Self {
            user_repository: UserRepository::new(db_pool),
            jwt_service,
            rate_limiter,
        }
    }
}
