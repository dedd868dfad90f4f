pub mod command;
pub mod error;
pub mod group;
pub mod progress;
