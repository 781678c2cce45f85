//! Discord bot: on-demand commands and the report schedule.

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use super::scheduler::run_schedule;
use crate::config::{parse_currency_list, Config};
use crate::error::{AppError, ConfigError, DiscordError};
use crate::market::EcoClient;
use crate::metrics;
use crate::report::{render_discord, split_message, ReportPipeline, ReportRequest, DISCORD_MESSAGE_LIMIT};
use crate::utils::shutdown_signal;

/// Shared state for every command invocation.
pub struct Data {
    pub pipeline: Arc<ReportPipeline<EcoClient>>,
}

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, Data, Error>;

const HELP_TEXT: &str = "\
**Eco Market Bot**
`/market [limit] [currencies]` or `!market [limit] [currencies]`
Show the current cross-store trade opportunities.
- `limit`: how many to show (default from config)
- `currencies`: comma-separated filter, e.g. `Credits,Gold`

Scheduled reports are posted automatically.";

/// Show current arbitrage opportunities.
#[poise::command(slash_command, prefix_command)]
pub async fn market(
    ctx: Context<'_>,
    #[description = "Maximum opportunities to show"] limit: Option<u32>,
    #[description = "Comma-separated currency filter"] currencies: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;

    let request = market_request(limit, currencies.as_deref());
    let text = match ctx.data().pipeline.run(&request).await {
        Ok(report) => render_discord(&report),
        Err(e) => {
            warn!(error = %e, "On-demand report failed");
            format!("Error generating report: {}", e)
        }
    };

    for chunk in split_message(&text, DISCORD_MESSAGE_LIMIT) {
        ctx.say(chunk).await?;
    }
    metrics::inc_reports_sent("command");

    Ok(())
}

/// Show bot usage.
#[poise::command(slash_command, prefix_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(HELP_TEXT).await?;
    Ok(())
}

/// Turn command arguments into pipeline overrides.
fn market_request(limit: Option<u32>, currencies: Option<&str>) -> ReportRequest {
    let currencies = currencies
        .map(parse_currency_list)
        .filter(|set| !set.is_empty());

    ReportRequest {
        limit: limit.filter(|l| *l > 0).map(|l| l as usize),
        currencies,
        min_profit: None,
    }
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!(error = %error, "Bot setup failed");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            warn!(command = %ctx.command().name, error = %error, "Command failed");
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                warn!(error = %e, "Error while handling error");
            }
        }
    }
}

/// Run the bot until shutdown.
pub async fn run_bot(config: Config) -> Result<(), AppError> {
    config.validate_discord()?;
    let token = config
        .discord_token
        .clone()
        .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
    let channel = serenity::ChannelId::new(
        config
            .discord_channel_id
            .ok_or(ConfigError::Missing("DISCORD_CHANNEL_ID"))?,
    );
    let interval = config.report_interval_minutes;

    let pipeline = Arc::new(ReportPipeline::new(
        EcoClient::new(&config)?,
        config.engine_config(),
        config.report_limit,
    ));

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![market(), help()],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".into()),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!(user = %ready.user.name, "Bot connected");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                tokio::spawn(run_schedule(
                    ctx.http.clone(),
                    channel,
                    pipeline.clone(),
                    interval,
                ));
                info!(channel = %channel, interval_minutes = interval, "Report schedule started");

                Ok(Data { pipeline })
            })
        })
        .build();

    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .map_err(DiscordError::from)?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutting down bot");
        shard_manager.shutdown_all().await;
    });

    client.start().await.map_err(DiscordError::from)?;
    Ok(())
}
