//! Arbitrage module for detecting and tracking opportunities.
//!
//! This module handles:
//! - Pairing buy and sell offers and sizing the trade
//! - Cross-store detection and ranking
//! - Categorization for the detailed view
//! - Diffing successive cycles for the deal monitor

pub mod calculator;
pub mod categorize;
pub mod detector;
pub mod monitor;

pub use calculator::{calculate_opportunity, Opportunity};
pub use categorize::{categorize, Categories};
pub use detector::{compute_opportunities, rank, scan, scan_listings, EngineConfig, Scan};
pub use monitor::{
    book_from, deal_value, diff_deals, good_deals, DealBook, DealDiff, DealKey, DealMonitor,
    MonitorEvent,
};
