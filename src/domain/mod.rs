//! Pure domain types: values, rows, table declarations and the identity map.
//!
//! Nothing in this module performs I/O.

pub mod entity;
pub mod errors;
pub mod identity_map;
pub mod record;
pub mod row;
pub mod table_spec;
pub mod value;
