//! Library side of the `drm` station binary: arguments, configuration,
//! logging and the commands themselves.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod summary;
pub mod types;
