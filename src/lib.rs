//! pm-onboard: project onboarding wizard and Document Store.

pub mod client;
pub mod config;
pub mod error;
pub mod onboarding;
pub mod store;
pub mod wizard;
