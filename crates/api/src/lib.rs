//! HTTP surface for the depot backend.
//!
//! The binary in `main.rs` wires configuration, the database pool and the
//! router built by [`app::build_app`]. Everything behind `/api` except
//! registration and login sits behind the bearer-token guard in
//! [`middleware`].

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;

pub use config::Config;
