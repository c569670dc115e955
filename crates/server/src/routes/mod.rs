pub mod admin;
pub mod equipment;
pub mod health;
pub mod laboratory;
pub mod reservation;
pub mod root;
pub mod user;
