//! Contact-center idle monitor for Genesys Cloud
//!
//! Pulls agent presence and routing status, derives occupancy metrics and
//! trends, and optionally asks an LLM for a floor analysis.

pub mod agents;
pub mod config;
pub mod dashboard;
pub mod filter;
pub mod genesys;
pub mod history;
pub mod insight;
pub mod metrics;
pub mod profiles;
pub mod render;
pub mod session;
