pub mod employee;
pub mod entitlement;
pub mod leave_request;
pub mod leave_type;

// Re-export all repositories for easy importing
pub use employee::EmployeeRepository;
pub use entitlement::EntitlementRepository;
pub use leave_request::LeaveRequestRepository;
pub use leave_type::LeaveTypeRepository;
