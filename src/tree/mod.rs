pub mod geometry;
pub mod identity;
pub mod snapshot;
pub mod tree_model;
