//! Wall-clock aligned report schedule.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use poise::serenity_prelude::{ChannelId, Http};
use tracing::{info, warn};

use crate::error::DiscordError;
use crate::market::MarketSource;
use crate::metrics;
use crate::report::{render_discord, split_message, ReportPipeline, ReportRequest, DISCORD_MESSAGE_LIMIT};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// First slot strictly after `now`.
///
/// Slots are multiples of `interval_minutes` counted from local midnight, so a
/// 30 minute interval fires at :00 and :30. The schedule restarts at midnight.
pub fn next_slot(now: NaiveDateTime, interval_minutes: u32) -> NaiveDateTime {
    let interval = i64::from(interval_minutes.max(1));
    let midnight = now.date().and_time(NaiveTime::MIN);
    let elapsed = (now - midnight).num_minutes();
    let next = (elapsed / interval + 1) * interval;

    if next >= MINUTES_PER_DAY {
        midnight + Duration::days(1)
    } else {
        midnight + Duration::minutes(next)
    }
}

/// Time to wait from `now` until the next slot.
pub fn delay_until_next(now: NaiveDateTime, interval_minutes: u32) -> std::time::Duration {
    (next_slot(now, interval_minutes) - now)
        .to_std()
        .unwrap_or_default()
}

/// Post a report to `channel` at every slot, forever.
///
/// The first report goes out at the next slot, not on startup.
pub async fn run_schedule<S: MarketSource>(
    http: Arc<Http>,
    channel: ChannelId,
    pipeline: Arc<ReportPipeline<S>>,
    interval_minutes: u32,
) {
    loop {
        let now = Local::now().naive_local();
        info!(next = %next_slot(now, interval_minutes), "Next scheduled report");
        tokio::time::sleep(delay_until_next(now, interval_minutes)).await;

        match post_report(&http, channel, &pipeline).await {
            Ok(chunks) => info!(channel = %channel, chunks, "Scheduled report posted"),
            Err(e) => warn!(error = %e, "Scheduled report skipped"),
        }
    }
}

/// Generate one report and post it, returning the number of messages sent.
pub async fn post_report<S: MarketSource>(
    http: &Http,
    channel: ChannelId,
    pipeline: &ReportPipeline<S>,
) -> Result<usize, DiscordError> {
    let report = pipeline
        .run(&ReportRequest::default())
        .await
        .map_err(|e| DiscordError::Report(e.to_string()))?;

    let chunks = split_message(&render_discord(&report), DISCORD_MESSAGE_LIMIT);
    for chunk in &chunks {
        channel.say(http, chunk).await?;
    }
    metrics::inc_reports_sent("scheduled");

    Ok(chunks.len())
}
