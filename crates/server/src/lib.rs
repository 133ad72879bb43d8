//! Roster server library.
//!
//! Provides the core server functionality including configuration,
//! service implementations, server assembly, and shutdown handling.

#![deny(unsafe_code)]

pub mod config;
pub mod server;
pub mod services;
pub mod shutdown;
