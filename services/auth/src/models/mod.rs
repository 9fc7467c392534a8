//! Authentication service models

pub mod user;

// Re-export for convenience
pub use user::{
    CreateUserRequest, NewUser, TokenRequest, TokenResponse, UpdateProfileRequest, UpdateUser,
    User, UserError, UserResponse, normalize_email,
};
