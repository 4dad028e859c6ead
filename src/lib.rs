pub mod compiler;
pub mod dsl;
pub mod graph;
pub mod manifest;
pub mod schema;
