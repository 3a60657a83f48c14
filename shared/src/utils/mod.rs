//! Shared utilities

pub mod code;
