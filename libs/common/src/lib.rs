//! Common library for the recipe application
//!
//! This crate provides shared functionality used by the recipe service,
//! including database connectivity and database error handling.

pub mod database;
pub mod error;
