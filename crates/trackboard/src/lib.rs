#![doc = include_str!("../../../README.md")]
//!

//! This crate bundles the dashboard library and its web server.

pub use trackboard_core::*;
pub use trackboard_server as server;
