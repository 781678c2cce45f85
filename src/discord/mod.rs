//! Discord delivery.
//!
//! This module handles:
//! - `market` and `help` commands, both slash and `!` prefix
//! - Posting scheduled reports on wall-clock slots

pub mod bot;
pub mod scheduler;

pub use bot::{run_bot, Data};
pub use scheduler::{delay_until_next, next_slot, post_report, run_schedule};
