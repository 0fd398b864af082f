//! Quipboard: community leaderboard server with a staged draft roster.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod identity;
pub mod metrics;
pub mod presenter;
pub mod publish;
pub mod query;
pub mod staging;
pub mod state;
