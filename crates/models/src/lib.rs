pub mod audit_action;
pub mod equipment;
pub mod reservation_status;
pub mod user_type;
