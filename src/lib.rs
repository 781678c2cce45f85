//! Cross-store arbitrage reports for the Eco game economy.
//!
//! Stores on an Eco server both sell items to players and buy items from
//! them. When one store sells an item for less than another store pays for
//! it, in the same currency, the difference is profit per unit:
//!
//! ```text
//! Hewn Log at Lumber Co:   sells for 10.00 Credits
//! Hewn Log at Builders:    buys for  25.00 Credits
//! ───────────────────────────────────────────────
//! Profit:                  15.00 Credits per unit
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`market`]: Store payload, normalization and sources
//! - [`arbitrage`]: Opportunity detection, categorization and deal diffing
//! - [`crafting`]: Crafting and profession profit analysis
//! - [`report`]: Report pipeline and rendering
//! - [`discord`]: Bot commands and scheduled posts
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod arbitrage;
pub mod config;
pub mod crafting;
pub mod discord;
pub mod error;
pub mod market;
pub mod metrics;
pub mod report;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
