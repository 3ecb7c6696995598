//! HTTP inbound adapter exposing the booking REST endpoints.

pub mod admin;
pub mod bookings;
pub mod error;
pub mod health;
pub mod kundas;
pub mod registration;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod stats;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
