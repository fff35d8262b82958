// Data models for dispatch, reminders, account functions and operator tooling

pub mod account;
pub mod ai_usage;
pub mod calendar;
pub mod command;
pub mod notification;
pub mod program_ingest;
pub mod scheduled_notification;
pub mod schema;
pub mod stats;
pub mod workout_plan;

pub use account::*;
pub use ai_usage::*;
pub use calendar::*;
pub use command::*;
pub use notification::*;
pub use program_ingest::*;
pub use scheduled_notification::*;
pub use schema::*;
pub use stats::*;
pub use workout_plan::*;
