//! Application layer: the import use case and its run report.

pub mod foreign_keys;
pub mod import_engine;
pub mod report;
