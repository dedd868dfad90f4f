pub mod adb;
pub mod bridge;
pub mod device_model;
pub mod error;
