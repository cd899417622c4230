//! Configuration, country resolution, and event dispatch for the Name Value
//! leaderboard.
//!
//! This crate sits between the inbound live event feed and the two stateful
//! subsystems: the point ledger and the announcement queue.
//!
//! # Modules
//!
//! - [`config`] -- `namevalue-config.yaml` loading with environment
//!   overrides.
//! - [`country`] -- Maps free-text comments to canonical country codes.
//! - [`dispatcher`] -- The [`EventDispatcher`]: routes gifts, comments, and
//!   joins, serializes ledger writes, and broadcasts leaderboard updates.

pub mod config;
pub mod country;
pub mod dispatcher;

pub use config::{ConfigError, DispatcherConfig, NameValueConfig, ServerConfig};
pub use country::{CountryInfo, ResolvedCountry, country_info, resolve};
pub use dispatcher::{DispatchOutcome, EventDispatcher, IgnoreReason};
