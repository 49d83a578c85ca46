//! Dashboard data binding client
//!
//! Binds dashboard modules to backend endpoints: concurrent source loads with
//! caching and fallbacks, declarative transforms and auto-refresh.

pub mod api;
pub mod binding;
pub mod cli_messages;
pub mod config;
pub mod consts;
pub mod environment;
pub mod error_classifier;
pub mod events;
pub mod logging;
pub mod presets;
pub mod session;
