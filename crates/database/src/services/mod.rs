pub mod audit_log;
pub mod equipment;
pub mod laboratory;
pub mod propagation;
pub mod reservation;
pub mod seed;
pub mod time_slot;
pub mod user;

/// Current time as stored in the database
pub(crate) fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}
