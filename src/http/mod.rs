//! Dashboard web server: embedded page plus JSON API

pub mod handler;
pub mod server;

pub use server::{AppState, HttpServer};
