//! Report generation and rendering.
//!
//! A [`Report`] is one engine run plus the parameters that produced it.
//! The [`format`] functions turn it into terminal text or Discord markdown.
//! [`crafting`] renders the crafting and profession analyses.

pub mod crafting;
pub mod emoji;
pub mod format;
pub mod pipeline;

use std::collections::BTreeSet;

use chrono::{DateTime, Local};
use rust_decimal::Decimal;

use crate::arbitrage::{EngineConfig, Scan};

pub use crafting::{profession_emoji, render_crafting, render_professions, CRAFTING_LIMIT};
pub use emoji::item_emoji;
pub use format::{
    format_line, format_lines, render_discord, render_monitor_event, render_terminal,
    split_message, DISCORD_MESSAGE_LIMIT, NO_OPPORTUNITIES,
};
pub use pipeline::{ReportPipeline, ReportRequest};

/// One generated report.
#[derive(Debug, Clone)]
pub struct Report {
    /// When the report was generated.
    pub generated_at: DateTime<Local>,
    /// Engine output.
    pub scan: Scan,
    /// Per-unit profit threshold used.
    pub min_profit: Decimal,
    /// Currency allow-list used, empty for all.
    pub currencies: BTreeSet<String>,
    /// Maximum entries to render.
    pub limit: usize,
}

impl Report {
    pub fn new(scan: Scan, engine: &EngineConfig, limit: usize) -> Self {
        Self {
            generated_at: Local::now(),
            scan,
            min_profit: engine.min_profit,
            currencies: engine.currencies.clone(),
            limit,
        }
    }

    fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M").to_string()
    }

    fn currency_label(&self) -> String {
        if self.currencies.is_empty() {
            "all currencies".to_string()
        } else {
            self.currencies
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    fn skipped_note(&self) -> Option<String> {
        match self.scan.skipped {
            0 => None,
            1 => Some("Skipped 1 malformed listing record".to_string()),
            n => Some(format!("Skipped {} malformed listing records", n)),
        }
    }
}
