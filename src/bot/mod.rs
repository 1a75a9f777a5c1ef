//! Discord bot implementation.
//!
//! Wires the serenity gateway to the fact-checking engine: message
//! monitoring with automatic checks, reply-with-mention checks, prefix
//! commands and feedback buttons.

pub mod commands;
pub mod embeds;
pub mod feedback;

use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serenity::all::{
    ActivityData, Client, Context, CreateAllowedMentions, CreateMessage, EventHandler,
    GatewayIntents, Interaction, Message, Ready,
};
use serenity::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::factcheck::{truncate_chars, FactChecker};
use crate::integrations::GeminiClient;
use crate::metrics;
use crate::rate_limit::{Cooldowns, GlobalRateLimiter, RateLimiter};
use crate::triggers::TriggerScanner;
use crate::{Error, Result};

pub use feedback::FeedbackLog;

/// Shared bot state.
pub struct BotState {
    pub config: Config,
    pub checker: FactChecker,
    pub scanner: TriggerScanner,
    pub user_limiter: Mutex<RateLimiter>,
    pub global_limiter: Mutex<GlobalRateLimiter>,
    pub cooldowns: Mutex<Cooldowns>,
    pub feedback: FeedbackLog,
    pub checks_completed: AtomicU64,
    pub started_at: Instant,
}

impl BotState {
    pub fn new(config: Config, checker: FactChecker) -> Self {
        let scanner = TriggerScanner::new(
            &config.bot.trigger_keywords,
            config.bot.min_message_length,
            config.bot.max_message_length,
        );
        let user_limiter = RateLimiter::new(
            config.rate_limit.max_requests,
            config.rate_limit.time_window(),
        );
        let global_limiter = GlobalRateLimiter::new(config.rate_limit.global_per_minute);

        Self {
            config,
            checker,
            scanner,
            user_limiter: Mutex::new(user_limiter),
            global_limiter: Mutex::new(global_limiter),
            cooldowns: Mutex::new(Cooldowns::new()),
            feedback: FeedbackLog::new(),
            checks_completed: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    fn is_blacklisted(&self, user_id: u64) -> bool {
        self.config.security.blacklisted_users.contains(&user_id)
    }
}

/// serenity event handler.
pub struct Handler {
    state: Arc<BotState>,
}

impl Handler {
    pub fn new(state: Arc<BotState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} has connected to Discord!", ready.user.name);
        info!("Bot is in {} guilds", ready.guilds.len());

        ctx.set_activity(Some(ActivityData::watching(format!(
            "for misinformation | {}factcheck",
            self.state.config.bot.command_prefix
        ))));
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let state = &self.state;

        // Ignore our own messages
        if msg.author.id == ctx.cache.current_user().id {
            return;
        }

        if state.is_blacklisted(msg.author.id.get()) {
            return;
        }

        // Ignore other bots unless configured otherwise
        if msg.author.bot && !state.config.bot.respond_to_bots {
            return;
        }

        // A reply that mentions the bot asks for a check of the quoted message
        if msg.message_reference.is_some() && msg.mentions_me(&ctx).await.unwrap_or(false) {
            self.handle_reply_with_mention(&ctx, &msg).await;
            return;
        }

        // Prefix commands
        if state.config.features.manual_commands && commands::dispatch(&ctx, &msg, state).await {
            return;
        }

        // Automatic fact-checking
        if !state.config.features.auto_checking || !state.config.bot.auto_fact_check {
            return;
        }

        if !state.scanner.should_check(&msg.content) {
            return;
        }

        if state.config.features.rate_limiting {
            let allowed = state
                .user_limiter
                .lock()
                .await
                .check(&msg.author.id.to_string());
            if !allowed {
                metrics::record_rate_limited("user");
                debug!("Auto-check rate limited for user {}", msg.author.id);
                return;
            }

            if !state.global_limiter.lock().await.check() {
                metrics::record_rate_limited("global");
                return;
            }
        }

        self.auto_fact_check(&ctx, &msg).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            if let Err(err) = feedback::handle_component(&ctx, &component, &self.state.feedback).await
            {
                error!("Error handling feedback interaction: {}", err);
            }
        }
    }
}

impl Handler {
    /// Automatically fact-check a flagged message.
    async fn auto_fact_check(&self, ctx: &Context, msg: &Message) {
        let state = &self.state;
        let typing = msg.channel_id.start_typing(&ctx.http);

        metrics::record_check_start("auto");
        let start = Instant::now();
        let outcome = state.checker.check_claim(&msg.content).await;
        metrics::record_check_result("auto", start.elapsed(), outcome.is_ok());

        typing.stop();

        match outcome {
            Ok(result) => {
                state.checks_completed.fetch_add(1, Ordering::Relaxed);
                let embed = embeds::truthiness_embed(
                    &msg.content,
                    &result,
                    true,
                    state.checker.model(),
                    &state.config.response,
                );
                let builder = CreateMessage::new()
                    .embed(embed)
                    .reference_message(msg)
                    .allowed_mentions(CreateAllowedMentions::new());

                if let Err(err) = msg.channel_id.send_message(&ctx.http, builder).await {
                    error!("Failed to send auto fact-check reply: {}", err);
                }
            }
            Err(err) => {
                // No error replies for auto checks to avoid spam
                error!(
                    "Error in auto fact-check for message {}: {}",
                    truncate_chars(&msg.content, 50),
                    err
                );
            }
        }
    }

    /// Fact-check the message a reply points at, combined with the reply text.
    async fn handle_reply_with_mention(&self, ctx: &Context, msg: &Message) {
        let state = &self.state;

        let referenced = match self.fetch_referenced(ctx, msg).await {
            Ok(referenced) => referenced,
            Err(err) => {
                error!("Failed to fetch referenced message: {}", err);
                let builder = CreateMessage::new()
                    .content("❌ Original message not found.")
                    .reference_message(msg)
                    .allowed_mentions(CreateAllowedMentions::new());
                if let Err(err) = msg.channel_id.send_message(&ctx.http, builder).await {
                    error!("Failed to send reply: {}", err);
                }
                return;
            }
        };

        let combined = format!("{}\n{}", referenced.content, msg.content);

        let typing = msg.channel_id.start_typing(&ctx.http);

        metrics::record_check_start("reply");
        let start = Instant::now();
        let outcome = state.checker.check_claim(&combined).await;
        metrics::record_check_result("reply", start.elapsed(), outcome.is_ok());

        typing.stop();

        match outcome {
            Ok(result) => {
                state.checks_completed.fetch_add(1, Ordering::Relaxed);
                let embed = embeds::truthiness_embed(
                    &combined,
                    &result,
                    false,
                    state.checker.model(),
                    &state.config.response,
                );
                let row = feedback::feedback_row(result.accuracy.label());
                let builder = CreateMessage::new()
                    .embed(embed)
                    .components(vec![row])
                    .reference_message(msg)
                    .allowed_mentions(CreateAllowedMentions::new());

                if let Err(err) = msg.channel_id.send_message(&ctx.http, builder).await {
                    error!("Failed to send reply fact-check: {}", err);
                }
            }
            Err(err) => {
                error!("Error handling reply with mention: {}", err);
                let builder = CreateMessage::new()
                    .content("❌ An error occurred while processing your request.")
                    .reference_message(msg)
                    .allowed_mentions(CreateAllowedMentions::new());
                if let Err(err) = msg.channel_id.send_message(&ctx.http, builder).await {
                    error!("Failed to send error reply: {}", err);
                }
            }
        }
    }

    async fn fetch_referenced(&self, ctx: &Context, msg: &Message) -> Result<Message> {
        if let Some(referenced) = &msg.referenced_message {
            return Ok((**referenced).clone());
        }

        let reference = msg
            .message_reference
            .as_ref()
            .and_then(|r| r.message_id)
            .ok_or_else(|| Error::DiscordError("Reply carries no message id".to_string()))?;

        Ok(msg.channel_id.message(&ctx.http, reference).await?)
    }
}

/// Admin check: configured admin users, guild owner, or Manage Guild.
pub(crate) fn is_admin(ctx: &Context, msg: &Message, state: &Arc<BotState>) -> bool {
    if state
        .config
        .security
        .admin_users
        .contains(&msg.author.id.get())
    {
        return true;
    }

    let Some(guild_id) = msg.guild_id else {
        return false;
    };

    if let Some(guild) = ctx.cache.guild(guild_id) {
        if guild.owner_id == msg.author.id {
            return true;
        }
        if let Some(member) = guild.members.get(&msg.author.id) {
            return guild.member_permissions(member).manage_guild();
        }
    }

    false
}

/// Periodic rate-limiter and cache housekeeping.
fn spawn_housekeeping(state: Arc<BotState>) {
    let rate_interval =
        Duration::from_secs(state.config.performance.rate_limit_cleanup_interval_secs);
    let cache_interval = Duration::from_secs(state.config.performance.cache_cleanup_interval_secs);

    let rate_state = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(rate_interval).await;
            rate_state.user_limiter.lock().await.cleanup();
            rate_state
                .cooldowns
                .lock()
                .await
                .cleanup(rate_interval.max(Duration::from_secs(120)));
        }
    });

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(cache_interval).await;
            state.checker.cleanup_cache().await;
        }
    });
}

/// Run the Discord bot until the gateway connection ends.
pub async fn run(config: Config) -> anyhow::Result<()> {
    config.ensure_valid()?;

    let token =
        env::var("DISCORD_TOKEN").map_err(|_| Error::MissingEnv("DISCORD_TOKEN".to_string()))?;

    let gemini = GeminiClient::from_env(&config.gemini)?;
    let checker = FactChecker::new(gemini, &config);
    let state = Arc::new(BotState::new(config, checker));

    spawn_housekeeping(state.clone());

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    info!("Starting Discord Fact-Checker Bot...");

    let mut client = Client::builder(&token, intents)
        .event_handler(Handler::new(state))
        .await?;

    client.start().await?;
    Ok(())
}
