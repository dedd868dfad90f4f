pub mod bounds;
pub mod dump_parser;
