//! Database access shared across Vendio services

pub mod init;
pub mod settings;

pub use init::{create_schema, init_database};
