//! HTTP client for the NumRelay backend API

mod client;
mod dto;

pub use client::ApiClient;
