//! Recipe sharing service
//!
//! Users register and log in with a username and password, then create,
//! edit and delete their own recipes. Anyone may browse and filter them.

pub mod config;
pub mod credentials;
pub mod database;
pub mod error;
pub mod imaging;
pub mod middleware;
pub mod models;
pub mod parser;
pub mod recipes;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;
pub mod views;

pub use state::AppState;
