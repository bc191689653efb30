//! Authentication module
//!
//! Provides JWT-based authentication with argon2 password hashing,
//! role-checking extractors and login attempt limiting.

mod jwt;
mod login_limit;
mod middleware;
mod password;

pub use jwt::{Claims, JwtService, TokenSubject};
pub use login_limit::{
    AttemptState, AttemptStore, LoginLimiter, MemoryAttemptStore, RedisAttemptStore,
};
pub use middleware::{AdminUser, AuthUser, StaffUser};
pub use password::PasswordService;
