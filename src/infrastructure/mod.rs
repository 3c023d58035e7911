//! Adapters implementing the ports against real sources and stores.

pub mod files;
pub mod log_observer;
pub mod oracle;
pub mod store;
