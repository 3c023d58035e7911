//! # Table Importer
//!
//! Imports rows from legacy source tables into a target record store while
//! keeping foreign keys consistent. Source identifiers are remapped to the
//! identifiers the target store assigns, and records that were imported
//! before are found again through a natural key and updated in place.
//!
//! This crate follows the **Hexagonal Architecture** (Ports and Adapters):
//! `domain` and `application` never touch a database or file directly; they
//! talk to the traits in `ports`, implemented under `infrastructure`.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;
