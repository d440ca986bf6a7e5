//! Command handlers for the carlot binary.

pub mod check;
pub mod config;
pub mod ingest;
