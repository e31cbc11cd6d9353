// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const REGISTER_CREATED: &str = "auth.register.created";
pub const LOGIN_SUCCESS: &str = "auth.login.success";
pub const LOGIN_FAILURE: &str = "auth.login.failure";
pub const LOCKOUT_TRIGGERED: &str = "auth.lockout.triggered";
pub const ROLE_DENIED: &str = "auth.role.denied";
pub const SESSION_ACTIVE: &str = "session.active";
pub const CHAT_MESSAGE: &str = "chat.message";
pub const GATEWAY_FAILURE: &str = "chat.gateway.failure";
