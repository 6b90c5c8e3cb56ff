pub mod entitlements;
pub mod leave_requests;
pub mod shared;
