// ============================
// chatterd-backend-lib/src/auth/mod.rs
// ============================
//! Identity & access control module.

pub mod gate;
pub mod lockout;
pub mod password;
pub mod session;
pub mod token_generator;
pub mod validate;
mod service;
mod service_impl;

pub use gate::{require_authenticated, require_role, AuthCheck};
pub use lockout::LockoutTracker;
pub use password::{hash_password, hash_password_secure, verify_password};
pub use session::{SessionIdentity, SessionManager};
pub use validate::{
    normalize_email, validate_email, validate_password, PasswordRequirements, PasswordRule,
    MIN_PASSWORD_LENGTH,
};
pub use service::IdentityService;
pub use service_impl::DefaultIdentity;
