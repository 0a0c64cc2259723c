//! HTTP inbound adapter exposing REST endpoints.

pub mod archive;
pub mod dto;
pub mod error;
pub mod health;
pub mod notifications;
pub mod obstacles;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
