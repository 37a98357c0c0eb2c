pub mod index_builder;
pub mod json;
