//! Markdown documentation for database schemas.
//!
//! Catalog metadata flows from a [`catalog::MetadataProvider`] through
//! [`schema::normalize`] and [`render::render_table`] into files written by
//! [`generate::Generator`].

pub mod catalog;
pub mod config;
pub mod generate;
pub mod render;
pub mod schema;
pub mod writer;
