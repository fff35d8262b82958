// API routes and handlers

pub mod account;
pub mod ai_usage;
pub mod calendar;
pub mod health;
pub mod notifications;
pub mod program_ingest;
pub mod reminders;
pub mod routes;

pub use routes::{create_routes, AppState};
