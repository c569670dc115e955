pub mod admins;
pub mod audit_logs;
pub mod equipment;
pub mod laboratories;
pub mod reservations;
pub mod students;
pub mod teachers;
pub mod time_slots;
