//! Ports: the traits the import engine talks to.

pub mod import_observer;
pub mod row_source;
pub mod target_store;
