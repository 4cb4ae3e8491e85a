//! Agent Launch — onboarding wizard service.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod wizard;
