//! Business services

pub mod purchase;

pub use purchase::*;
