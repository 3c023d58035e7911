pub mod connection_manager;
pub mod oracle_row_source;
pub mod sql_utils;
