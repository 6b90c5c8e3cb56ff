pub mod employee;
pub mod entitlement;
pub mod leave_request;
pub mod leave_type;
pub(crate) mod macros;

// Re-export all models for easy importing
pub use employee::*;
pub use entitlement::*;
pub use leave_request::*;
pub use leave_type::*;
