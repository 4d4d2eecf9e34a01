//! Internal modules for the table client.
//!
//! This library provides the HTTP gateway, command parsing, configuration
//! and terminal rendering used by the table_sync_client binary.

pub mod api_client;
pub mod commands;
pub mod config;
pub mod display;
pub mod logging;
