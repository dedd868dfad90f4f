pub mod hit_test;
pub mod occlusion;
pub mod open_span;
pub mod scroll_search;
pub mod search_model;
