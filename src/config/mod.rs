// ABOUTME: Configuration module grouping environment-derived server settings
// ABOUTME: Re-exports the typed configuration used at startup
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Server configuration.

pub mod environment;

pub use environment::{Environment, ServerConfig};
