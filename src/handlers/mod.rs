//! HTTP handlers

pub mod health;
pub mod ingest;
pub mod predictions;
