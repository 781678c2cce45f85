//! Text rendering for terminal and chat.

use std::fmt::Write;

use rust_decimal::Decimal;

use super::emoji::item_emoji;
use super::Report;
use crate::arbitrage::{categorize, DealDiff, MonitorEvent, Opportunity};

/// Discord's per-message character limit.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Total profit at which a chat entry gets the siren highlight.
pub const SIREN_PROFIT: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Message shown instead of an empty list.
pub const NO_OPPORTUNITIES: &str = "No profitable opportunities found.";

/// One line per opportunity, at most `limit`, with a note for the rest.
pub fn format_lines(opportunities: &[Opportunity], limit: usize) -> Vec<String> {
    if opportunities.is_empty() {
        return vec![NO_OPPORTUNITIES.to_string()];
    }

    let mut lines: Vec<String> = opportunities
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, opp)| format!("{:>2}. {}", i + 1, format_line(opp)))
        .collect();

    if opportunities.len() > limit {
        lines.push(format!("... and {} more", opportunities.len() - limit));
    }

    lines
}

/// Single-line summary of an opportunity.
pub fn format_line(opp: &Opportunity) -> String {
    format!(
        "{}: {} → {} | buy {} | sell {} | profit {} {}",
        opp.item,
        opp.source_store,
        opp.destination_store,
        money(opp.buy_price),
        money(opp.sell_price),
        money(opp.profit),
        opp.currency,
    )
}

/// Plain-text report for the terminal.
pub fn render_terminal(report: &Report, detailed: bool) -> String {
    let mut out = String::new();
    let opportunities = &report.scan.opportunities;

    let _ = writeln!(out, "ECO MARKET REPORT - {}", report.timestamp());
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(
        out,
        "Found {} opportunities with >= {} profit per unit ({})",
        opportunities.len(),
        money(report.min_profit),
        report.currency_label(),
    );
    if let Some(note) = report.skipped_note() {
        let _ = writeln!(out, "{}", note);
    }
    let _ = writeln!(out);

    for line in format_lines(opportunities, report.limit) {
        let _ = writeln!(out, "{}", line);
    }

    if detailed && !opportunities.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "TRADE SIZING:");
        for (i, opp) in opportunities.iter().take(report.limit).enumerate() {
            let _ = writeln!(out, "{:>2}. {}", i + 1, opp.item);
            let _ = writeln!(
                out,
                "    BUY:  {} @ {} (qty: {})",
                opp.source_store,
                money(opp.buy_price),
                quantity(opp.buy_quantity)
            );
            let _ = writeln!(
                out,
                "    SELL: {} @ {} (qty: {})",
                opp.destination_store,
                money(opp.sell_price),
                quantity(opp.sell_quantity)
            );
            let _ = writeln!(
                out,
                "    PROFIT: {} ({} margin)",
                opp.total_profit()
                    .map(money)
                    .unwrap_or_else(|| format!("{}/unit", money(opp.profit))),
                percent(opp.margin_pct()),
            );
        }

        let categories = categorize(opportunities);
        let sections: [(&str, &[Opportunity]); 5] = [
            ("HIGH PROFIT (>= 50 total)", categories.high_profit.as_slice()),
            ("HIGH ROI (>= 50%)", categories.high_roi.as_slice()),
            ("LOW RISK (<= 20 invested)", categories.low_risk.as_slice()),
            ("BULK TRADE (>= 100 units)", categories.bulk.as_slice()),
            ("FREE ITEMS", categories.free.as_slice()),
        ];
        for (title, bucket) in sections {
            let _ = writeln!(out);
            let _ = writeln!(out, "{} - {}:", title, bucket.len());
            if bucket.is_empty() {
                let _ = writeln!(out, "None found.");
            }
            for (i, opp) in bucket.iter().take(5).enumerate() {
                let _ = writeln!(out, "{}. {}", i + 1, format_line(opp));
            }
        }
    }

    out
}

/// Markdown report for Discord.
pub fn render_discord(report: &Report) -> String {
    let mut out = String::new();
    let opportunities = &report.scan.opportunities;

    let _ = writeln!(out, "**Market Report** - {}", report.timestamp());
    let _ = writeln!(
        out,
        "Found {} opportunities with >= {} profit ({}):",
        opportunities.len(),
        money(report.min_profit),
        report.currency_label(),
    );
    if let Some(note) = report.skipped_note() {
        let _ = writeln!(out, "_{}_", note);
    }
    let _ = writeln!(out);

    if opportunities.is_empty() {
        out.push_str(NO_OPPORTUNITIES);
        return out;
    }

    for (i, opp) in opportunities.iter().take(report.limit).enumerate() {
        let _ = writeln!(out, "**{}. {}**", i + 1, discord_heading(opp));
        out.push_str(&discord_body(opp));
        out.push('\n');
    }

    if opportunities.len() > report.limit {
        let _ = writeln!(out, "... and {} more", opportunities.len() - report.limit);
    }

    out
}

/// Markdown for one deal monitor observation.
pub fn render_monitor_event(event: &MonitorEvent, threshold: Decimal) -> String {
    match event {
        MonitorEvent::Baseline(deals) if deals.is_empty() => {
            format!(
                "No good deals found (>= {} total profit). Monitoring...",
                money(threshold)
            )
        }
        MonitorEvent::Baseline(deals) => {
            let mut out = format!(
                "Current good deals (>= {} total profit):\n\n",
                money(threshold)
            );
            for (i, opp) in deals.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", i + 1, discord_heading(opp));
                out.push_str(&discord_body(opp));
                out.push('\n');
            }
            let _ = write!(out, "Found {} good deals. Monitoring for changes...", deals.len());
            out
        }
        MonitorEvent::Changes(diff) => render_diff(diff),
    }
}

fn render_diff(diff: &DealDiff) -> String {
    if diff.is_unchanged() {
        return format!("No changes. Monitoring {} good deals...", diff.retained);
    }

    let mut out = String::new();
    if !diff.appeared.is_empty() {
        let _ = writeln!(out, "NEW GOOD DEALS:");
        for opp in &diff.appeared {
            let _ = writeln!(out, "{}", discord_heading(opp));
            out.push_str(&discord_body(opp));
            out.push('\n');
        }
    }
    if !diff.disappeared.is_empty() {
        let _ = writeln!(out, "COMPLETED DEALS:");
        for opp in &diff.disappeared {
            let _ = writeln!(
                out,
                "{} {} ({} → {}) - NO LONGER AVAILABLE",
                item_emoji(&opp.item),
                opp.item,
                opp.source_store,
                opp.destination_store
            );
        }
    }
    out.trim_end().to_string()
}

fn discord_heading(opp: &Opportunity) -> String {
    let (amount, per_unit) = match opp.total_profit() {
        Some(total) => (total, ""),
        None => (opp.profit, "/unit"),
    };
    let profit = format!("{} {}{} profit", money(amount), opp.currency, per_unit);
    let highlight = if amount >= SIREN_PROFIT {
        format!("🚨 {} 🚨", profit)
    } else {
        profit
    };
    let warning = if opp.low_liquidity { " ⚠️ LOW LIQUIDITY" } else { "" };

    format!("{} {} ({}){}", item_emoji(&opp.item), opp.item, highlight, warning)
}

fn discord_body(opp: &Opportunity) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} → {} {} ({} margin)",
        money(opp.buy_price),
        money(opp.sell_price),
        opp.currency,
        percent(opp.margin_pct()),
    );
    let _ = writeln!(
        out,
        "Buy: {}{} qty:{}",
        opp.source_store,
        balance(opp.source_balance),
        quantity(opp.buy_quantity)
    );
    let _ = writeln!(
        out,
        "Sell: {}{} qty:{}",
        opp.destination_store,
        balance(opp.destination_balance),
        quantity(opp.sell_quantity)
    );
    if let Some(max) = opp.max_trade_quantity() {
        let _ = write!(out, "Max trade: {} units", max.normalize());
        if opp.low_liquidity {
            if let (Some(investment), Some(remaining)) = (opp.investment(), opp.remaining_balance()) {
                let _ = write!(
                    out,
                    " (Investment: {}, Remaining: {})",
                    money(investment),
                    money(remaining)
                );
            }
        }
        out.push('\n');
    }
    out
}

/// Split text into chunks of at most `max_chars` characters, breaking on
/// line boundaries where possible.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len <= max_chars {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= max_chars {
            current.push_str(line);
            current_len = line_len;
        } else {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

pub(super) fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

pub(super) fn percent(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("{:.0}%", v))
        .unwrap_or_else(|| "n/a".to_string())
}

fn quantity(value: Option<Decimal>) -> String {
    value
        .map(|q| q.normalize().to_string())
        .unwrap_or_else(|| "?".to_string())
}

fn balance(value: Option<Decimal>) -> String {
    value
        .map(|b| format!(" ({})", group_thousands(b)))
        .unwrap_or_default()
}

/// Whole-number rendering with comma separators, e.g. `12,500`.
fn group_thousands(value: Decimal) -> String {
    let digits = value.round_dp(0).abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value.is_sign_negative() && !grouped.chars().all(|c| c == '0') {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrage::{calculate_opportunity, diff_deals, book_from, EngineConfig, Scan};
    use crate::market::{Direction, Listing};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn opp(item: &str, buy: Decimal, sell: Decimal) -> Opportunity {
        calculate_opportunity(
            &Listing::new(item, "A", Direction::Sell, buy, "Credits"),
            &Listing::new(item, "B", Direction::Buy, sell, "Credits"),
            dec!(50),
        )
        .unwrap()
    }

    fn sized(item: &str, buy: Decimal, sell: Decimal, qty: Decimal, balance: Decimal) -> Opportunity {
        calculate_opportunity(
            &Listing::new(item, "A", Direction::Sell, buy, "Credits")
                .with_quantity(qty)
                .with_balance(balance),
            &Listing::new(item, "B", Direction::Buy, sell, "Credits")
                .with_quantity(qty)
                .with_balance(dec!(12500)),
            dec!(50),
        )
        .unwrap()
    }

    fn report(opportunities: Vec<Opportunity>, skipped: usize, limit: usize) -> Report {
        Report::new(
            Scan {
                listings: opportunities.len() * 2,
                opportunities,
                skipped,
                inactive: 0,
            },
            &EngineConfig::default(),
            limit,
        )
    }

    #[test]
    fn format_lines_lists_fields() {
        let lines = format_lines(&[opp("Wood", dec!(10), dec!(25))], 10);
        assert_eq!(
            lines,
            vec![" 1. Wood: A → B | buy 10.00 | sell 25.00 | profit 15.00 Credits".to_string()]
        );
    }

    #[test]
    fn format_lines_truncates_with_note() {
        let opps: Vec<_> = (0..5).map(|i| opp("Wood", dec!(1), Decimal::from(20 + i))).collect();
        let lines = format_lines(&opps, 3);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "... and 2 more");
    }

    #[test]
    fn format_lines_empty_is_single_message() {
        assert_eq!(format_lines(&[], 10), vec![NO_OPPORTUNITIES.to_string()]);
    }

    #[test]
    fn terminal_report_mentions_skipped_records() {
        let text = render_terminal(&report(vec![opp("Wood", dec!(10), dec!(25))], 1, 10), false);

        assert!(text.contains("Found 1 opportunities with >= 10.00 profit per unit (all currencies)"));
        assert!(text.contains("Skipped 1 malformed listing record"));
        assert!(text.contains("Wood: A → B"));
    }

    #[test]
    fn detailed_terminal_report_has_categories() {
        let text = render_terminal(
            &report(vec![sized("Wood", dec!(1), dec!(3), dec!(200), dec!(1000))], 0, 10),
            true,
        );

        assert!(text.contains("TRADE SIZING:"));
        assert!(text.contains("PROFIT: 400.00 (200% margin)"));
        assert!(text.contains("BULK TRADE (>= 100 units) - 1:"));
        assert!(text.contains("FREE ITEMS - 0:"));
    }

    #[test]
    fn discord_report_highlights_big_deals() {
        let text = render_discord(&report(
            vec![sized("Wood", dec!(10), dec!(20), dec!(15), dec!(160))],
            0,
            10,
        ));

        assert!(text.starts_with("**Market Report** - "));
        assert!(text.contains("**1. 🪵 Wood** (🚨 150.00 Credits profit 🚨) ⚠️ LOW LIQUIDITY"));
        assert!(text.contains("10.00 → 20.00 Credits (100% margin)"));
        assert!(text.contains("Buy: A (160) qty:15"));
        assert!(text.contains("Sell: B (12,500) qty:15"));
        assert!(text.contains("Max trade: 15 units (Investment: 150.00, Remaining: 10.00)"));
    }

    #[test]
    fn discord_report_without_quantities_shows_unit_profit() {
        let text = render_discord(&report(vec![opp("Clay", dec!(2), dec!(5))], 0, 10));
        assert!(text.contains("(3.00 Credits/unit profit)"));
        assert!(!text.contains("Max trade"));
    }

    #[test]
    fn discord_report_survives_absurd_quantities() {
        let text = render_discord(&report(
            vec![sized("Wood", dec!(1), dec!(900000), Decimal::MAX, dec!(10))],
            0,
            10,
        ));
        assert!(text.contains("(🚨 899999.00 Credits/unit profit 🚨) ⚠️ LOW LIQUIDITY"));

        let detailed = render_terminal(
            &report(vec![sized("Wood", dec!(1), dec!(900000), Decimal::MAX, dec!(10))], 0, 10),
            true,
        );
        assert!(detailed.contains("PROFIT: 899999.00/unit"));
    }

    #[test]
    fn discord_report_empty() {
        let text = render_discord(&report(vec![], 0, 10));
        assert!(text.ends_with(NO_OPPORTUNITIES));
    }

    #[test]
    fn monitor_rendering() {
        let wood = opp("Wood", dec!(10), dec!(70));
        let iron = opp("Iron", dec!(5), dec!(80));

        let baseline = render_monitor_event(&MonitorEvent::Baseline(vec![]), dec!(50));
        assert_eq!(baseline, "No good deals found (>= 50.00 total profit). Monitoring...");

        let (diff, _) = diff_deals(&book_from(&[wood.clone()]), &[iron]);
        let text = render_monitor_event(&MonitorEvent::Changes(diff), dec!(50));
        assert!(text.contains("NEW GOOD DEALS:"));
        assert!(text.contains("Iron"));
        assert!(text.contains("🪵 Wood (A → B) - NO LONGER AVAILABLE"));

        let (same, _) = diff_deals(&book_from(&[wood.clone()]), &[wood]);
        assert_eq!(
            render_monitor_event(&MonitorEvent::Changes(same), dec!(50)),
            "No changes. Monitoring 1 good deals..."
        );
    }

    #[test]
    fn split_message_prefers_line_breaks() {
        let text = "aaaa\nbbbb\ncccc\n";
        let chunks = split_message(text, 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n".to_string(), "cccc\n".to_string()]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn split_message_hard_splits_long_lines() {
        let text = "é".repeat(25);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn short_message_is_one_chunk() {
        assert_eq!(split_message("hi", DISCORD_MESSAGE_LIMIT), vec!["hi".to_string()]);
        assert!(split_message("", DISCORD_MESSAGE_LIMIT).is_empty());
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(dec!(0)), "0");
        assert_eq!(group_thousands(dec!(999)), "999");
        assert_eq!(group_thousands(dec!(1000)), "1,000");
        assert_eq!(group_thousands(dec!(1234567.4)), "1,234,567");
        assert_eq!(group_thousands(dec!(-2500)), "-2,500");
    }
}
