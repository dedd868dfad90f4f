pub mod refresher;
pub mod source;
