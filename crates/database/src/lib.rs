pub mod cache;
pub mod context;
pub mod db;
pub mod entities;
pub mod error;
pub mod services;
