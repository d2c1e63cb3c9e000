//! Web API module for the cycling-calendar application.

pub mod calendar;
pub mod error;
pub mod routes;
pub mod status;

pub use routes::*;
