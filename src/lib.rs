pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod filter;
pub mod logging;
pub mod pipeline;
pub mod race;
pub mod schedule;
pub mod services;
pub mod source;
pub mod state;
pub mod tiz;
pub mod utils;
pub mod web;
