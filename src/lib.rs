// ABOUTME: Library root for mintwatch - deployment lifecycle and retry core.
// ABOUTME: The CLI binary is in main.rs.

pub mod config;
pub mod deployment;
pub mod error;
pub mod lifecycle;
pub mod output;
pub mod retry;
pub mod service;
pub mod store;
pub mod types;
pub mod webhook;
