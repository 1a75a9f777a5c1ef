//! Prefix command parsing and handlers.
//!
//! Commands mirror the classic prefix interface: `!truthiness`, `!quickcheck`,
//! `!expose`, `!settings`, `!help`, `!ping`, `!stats`, with aliases and
//! per-user cooldowns.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serenity::all::{Context, CreateMessage, EditMessage, Message};
use tracing::error;

use super::embeds;
use super::feedback;
use super::BotState;
use crate::metrics;
use crate::Error;

/// Command metadata used by `!help`.
pub struct CommandInfo {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}

pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        name: "truthiness",
        aliases: &["truth", "verify", "factcheck"],
        description: "Analyze the truthiness of a specific claim.\nUsage: !truthiness <claim>",
    },
    CommandInfo {
        name: "quickcheck",
        aliases: &["qc"],
        description: "Quick fact-check with a basic response.\nUsage: !quickcheck <claim>",
    },
    CommandInfo {
        name: "expose",
        aliases: &["debunk", "disprove"],
        description: "Try to debunk/disprove a statement, or support it if debunking fails.\nUsage: !expose <claim>",
    },
    CommandInfo {
        name: "settings",
        aliases: &["config"],
        description: "Show current bot settings (Admin only).",
    },
    CommandInfo {
        name: "help",
        aliases: &[],
        description: "Show help information.",
    },
    CommandInfo {
        name: "ping",
        aliases: &[],
        description: "Check bot latency.",
    },
    CommandInfo {
        name: "stats",
        aliases: &[],
        description: "Show bot statistics.",
    },
];

/// Resolve a (possibly aliased) command name.
pub fn find_command(name: &str) -> Option<&'static CommandInfo> {
    let lower = name.to_lowercase();
    COMMANDS
        .iter()
        .find(|c| c.name == lower || c.aliases.contains(&lower.as_str()))
}

/// Split a message into command name and arguments, if it carries the prefix.
pub fn parse<'a>(content: &'a str, prefix: &str) -> Option<(&'a str, &'a str)> {
    let rest = content.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        return None;
    }
    match rest.split_once(char::is_whitespace) {
        Some((name, args)) => Some((name, args.trim())),
        None => Some((rest, "")),
    }
}

/// Dispatch a message as a command. Returns true when it was one.
pub async fn dispatch(ctx: &Context, msg: &Message, state: &Arc<BotState>) -> bool {
    let Some((name, args)) = parse(&msg.content, &state.config.bot.command_prefix) else {
        return false;
    };
    let Some(command) = find_command(name) else {
        // Unknown commands are ignored
        return false;
    };

    match command.name {
        "truthiness" => truthiness(ctx, msg, state, args).await,
        "quickcheck" => quickcheck(ctx, msg, state, args).await,
        "expose" => expose(ctx, msg, state, args).await,
        "settings" => settings(ctx, msg, state).await,
        "help" => help(ctx, msg, state, args).await,
        "ping" => ping(ctx, msg).await,
        "stats" => stats(ctx, msg, state).await,
        _ => unreachable!("command table covers all names"),
    }

    true
}

async fn send(ctx: &Context, msg: &Message, builder: CreateMessage) {
    if let Err(err) = msg.channel_id.send_message(&ctx.http, builder).await {
        error!("Failed to send command response: {}", err);
    }
}

async fn send_text(ctx: &Context, msg: &Message, text: &str) {
    send(ctx, msg, CreateMessage::new().content(text)).await;
}

/// Check the per-command cooldown, replying with the retry time on refusal.
async fn passes_cooldown(
    ctx: &Context,
    msg: &Message,
    state: &Arc<BotState>,
    command: &'static str,
    max_uses: usize,
    window: Duration,
) -> bool {
    let user_id = msg.author.id.get();
    let decision = state
        .cooldowns
        .lock()
        .await
        .check(command, user_id, max_uses, window);

    match decision {
        Ok(()) => true,
        Err(retry_after) => {
            metrics::record_rate_limited("cooldown");
            send(
                ctx,
                msg,
                CreateMessage::new().embed(embeds::cooldown_embed(retry_after)),
            )
            .await;
            false
        }
    }
}

/// Check the global API budget, replying on refusal.
async fn passes_global_limit(ctx: &Context, msg: &Message, state: &Arc<BotState>) -> bool {
    if !state.config.features.rate_limiting {
        return true;
    }
    if state.global_limiter.lock().await.check() {
        return true;
    }
    metrics::record_rate_limited("global");
    send(
        ctx,
        msg,
        CreateMessage::new().embed(embeds::error_embed(
            "⏳ Busy",
            "The bot has reached its global rate limit. Please try again in a minute.",
        )),
    )
    .await;
    false
}

async fn truthiness(ctx: &Context, msg: &Message, state: &Arc<BotState>, claim: &str) {
    if claim.is_empty() {
        let prefix = &state.config.bot.command_prefix;
        send(
            ctx,
            msg,
            CreateMessage::new().embed(embeds::usage_embed(
                "❓ How to use truthiness",
                format!(
                    "Please provide a claim to analyze.\n\n**Usage:** `{p}truthiness <your claim here>`\n\n**Example:** `{p}truthiness Drinking 8 glasses of water daily is necessary for health`",
                    p = prefix
                ),
            )),
        )
        .await;
        return;
    }

    if claim.chars().count() > state.config.gemini.max_claim_length {
        send_text(
            ctx,
            msg,
            &format!(
                "❌ Claim is too long. Please keep it under {} characters.",
                state.config.gemini.max_claim_length
            ),
        )
        .await;
        return;
    }

    if claim.trim().chars().count() < state.config.gemini.min_claim_length {
        send_text(
            ctx,
            msg,
            "❌ Claim is too short. Please provide a more detailed statement to fact-check.",
        )
        .await;
        return;
    }

    if !passes_cooldown(ctx, msg, state, "truthiness", 1, Duration::from_secs(30)).await {
        return;
    }
    if !passes_global_limit(ctx, msg, state).await {
        return;
    }

    let typing = msg.channel_id.start_typing(&ctx.http);

    metrics::record_check_start("truthiness");
    let start = Instant::now();
    let outcome = state.checker.check_claim(claim).await;
    metrics::record_check_result("truthiness", start.elapsed(), outcome.is_ok());

    typing.stop();

    match outcome {
        Ok(result) => {
            state.checks_completed.fetch_add(1, Ordering::Relaxed);
            let embed = embeds::truthiness_embed(
                claim,
                &result,
                false,
                state.checker.model(),
                &state.config.response,
            );
            let row = feedback::feedback_row(result.accuracy.label());
            send(
                ctx,
                msg,
                CreateMessage::new().embed(embed).components(vec![row]),
            )
            .await;
        }
        Err(Error::BlockedContent) => {
            send_text(ctx, msg, "❌ This claim contains content I can't process.").await;
        }
        Err(err) => {
            error!("Error in truthiness command: {}", err);
            send(
                ctx,
                msg,
                CreateMessage::new().embed(embeds::error_embed(
                    "❌ Truthiness Analysis Failed",
                    "I couldn't analyze this claim. This might be because:\n• The claim is too vague or subjective\n• There's an issue with the analysis service\n• The claim contains unsupported content",
                )),
            )
            .await;
        }
    }
}

async fn quickcheck(ctx: &Context, msg: &Message, state: &Arc<BotState>, claim: &str) {
    if claim.is_empty() {
        let prefix = &state.config.bot.command_prefix;
        send_text(
            ctx,
            msg,
            &format!(
                "❓ Please provide a claim to quickly fact-check. Usage: `{}quickcheck <claim>`",
                prefix
            ),
        )
        .await;
        return;
    }

    if claim.chars().count() > 500 {
        let prefix = &state.config.bot.command_prefix;
        send_text(
            ctx,
            msg,
            &format!(
                "❌ Claim too long for quick check. Use `{}truthiness` for longer claims.",
                prefix
            ),
        )
        .await;
        return;
    }

    if !passes_cooldown(ctx, msg, state, "quickcheck", 2, Duration::from_secs(60)).await {
        return;
    }
    if !passes_global_limit(ctx, msg, state).await {
        return;
    }

    let typing = msg.channel_id.start_typing(&ctx.http);

    metrics::record_check_start("quickcheck");
    let start = Instant::now();
    let outcome = state.checker.check_claim(claim).await;
    metrics::record_check_result("quickcheck", start.elapsed(), outcome.is_ok());

    typing.stop();

    match outcome {
        Ok(result) => {
            state.checks_completed.fetch_add(1, Ordering::Relaxed);
            send(
                ctx,
                msg,
                CreateMessage::new().embed(embeds::quick_check_embed(&result)),
            )
            .await;
        }
        Err(err) => {
            error!("Error in quick-check command: {}", err);
            send_text(ctx, msg, "❌ Could not perform quick fact-check on this claim.").await;
        }
    }
}

async fn expose(ctx: &Context, msg: &Message, state: &Arc<BotState>, claim: &str) {
    if claim.is_empty() {
        let prefix = &state.config.bot.command_prefix;
        send(
            ctx,
            msg,
            CreateMessage::new().embed(embeds::usage_embed(
                "❓ How to use expose",
                format!(
                    "Please provide a claim to expose or validate.\n\n**Usage:** `{p}expose <your claim here>`\n\n**Example:** `{p}expose The moon landing was fake`",
                    p = prefix
                ),
            )),
        )
        .await;
        return;
    }

    if claim.chars().count() > state.config.gemini.max_claim_length {
        send_text(
            ctx,
            msg,
            &format!(
                "❌ Claim is too long. Please keep it under {} characters.",
                state.config.gemini.max_claim_length
            ),
        )
        .await;
        return;
    }

    if claim.trim().chars().count() < state.config.gemini.min_claim_length {
        send_text(
            ctx,
            msg,
            "❌ Claim is too short. Please provide a more detailed statement to analyze.",
        )
        .await;
        return;
    }

    if !passes_cooldown(ctx, msg, state, "expose", 1, Duration::from_secs(45)).await {
        return;
    }
    if !passes_global_limit(ctx, msg, state).await {
        return;
    }

    let typing = msg.channel_id.start_typing(&ctx.http);

    metrics::record_check_start("expose");
    let start = Instant::now();
    let outcome = state.checker.expose_claim(claim).await;
    metrics::record_check_result("expose", start.elapsed(), outcome.is_ok());

    typing.stop();

    match outcome {
        Ok(result) => {
            state.checks_completed.fetch_add(1, Ordering::Relaxed);
            let embed = embeds::expose_embed(claim, &result, state.checker.model());
            let row = feedback::feedback_row(result.expose_type.label());
            send(
                ctx,
                msg,
                CreateMessage::new().embed(embed).components(vec![row]),
            )
            .await;
        }
        Err(err) => {
            error!("Error in expose command: {}", err);
            send(
                ctx,
                msg,
                CreateMessage::new().embed(embeds::error_embed(
                    "❌ Expose Analysis Failed",
                    "I couldn't analyze this claim for debunking. This might be because:\n• The claim is too vague or subjective\n• There's an issue with the analysis service\n• The claim contains unsupported content",
                )),
            )
            .await;
        }
    }
}

async fn settings(ctx: &Context, msg: &Message, state: &Arc<BotState>) {
    if !super::is_admin(ctx, msg, state) {
        send_text(
            ctx,
            msg,
            "❌ You need 'Manage Server' permission to view bot settings.",
        )
        .await;
        return;
    }

    send(
        ctx,
        msg,
        CreateMessage::new().embed(embeds::settings_embed(&state.config)),
    )
    .await;
}

async fn help(ctx: &Context, msg: &Message, state: &Arc<BotState>, args: &str) {
    let prefix = &state.config.bot.command_prefix;
    let name = args.split_whitespace().next().unwrap_or("");

    let embed = if name.is_empty() {
        embeds::help_embed(prefix)
    } else {
        match find_command(name) {
            Some(info) => embeds::command_help_embed(info.name, info.description, info.aliases),
            None => embeds::error_embed(
                "❌ Command Not Found",
                &format!("No command named `{}` found.", name),
            ),
        }
    };

    send(ctx, msg, CreateMessage::new().embed(embed)).await;
}

async fn ping(ctx: &Context, msg: &Message) {
    let start = Instant::now();
    let sent = msg
        .channel_id
        .send_message(&ctx.http, CreateMessage::new().content("🏓 Pong!"))
        .await;

    match sent {
        Ok(mut sent) => {
            let latency = start.elapsed().as_millis();
            if let Err(err) = sent
                .edit(
                    ctx,
                    EditMessage::new().content(format!("🏓 Pong! Bot latency: {}ms", latency)),
                )
                .await
            {
                error!("Failed to edit ping response: {}", err);
            }
        }
        Err(err) => error!("Failed to send ping response: {}", err),
    }
}

async fn stats(ctx: &Context, msg: &Message, state: &Arc<BotState>) {
    let guilds = ctx.cache.guild_count();
    let users = ctx.cache.user_count();
    let checks = state.checks_completed.load(Ordering::Relaxed);
    let (helpful, not_helpful) = state.feedback.counts().await;
    let limiter_stats = state.user_limiter.lock().await.stats();
    let uptime = state.started_at.elapsed().as_secs();

    send(
        ctx,
        msg,
        CreateMessage::new().embed(embeds::stats_embed(
            guilds,
            users,
            checks,
            helpful,
            not_helpful,
            &limiter_stats,
            uptime,
        )),
    )
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_command() {
        assert_eq!(parse("!truthiness the earth is flat", "!"), Some(("truthiness", "the earth is flat")));
    }

    #[test]
    fn test_parse_command_without_args() {
        assert_eq!(parse("!help", "!"), Some(("help", "")));
    }

    #[test]
    fn test_parse_trims_args() {
        assert_eq!(parse("!qc   spaced out claim  ", "!"), Some(("qc", "spaced out claim")));
    }

    #[test]
    fn test_parse_rejects_non_prefixed() {
        assert!(parse("truthiness claim", "!").is_none());
        assert!(parse("?truthiness claim", "!").is_none());
    }

    #[test]
    fn test_parse_rejects_bare_prefix() {
        assert!(parse("!", "!").is_none());
        assert!(parse("! spaced", "!").is_none());
    }

    #[test]
    fn test_parse_custom_prefix() {
        assert_eq!(parse("??expose claim text", "??"), Some(("expose", "claim text")));
    }

    #[test]
    fn test_find_command_by_name() {
        assert_eq!(find_command("truthiness").unwrap().name, "truthiness");
        assert_eq!(find_command("stats").unwrap().name, "stats");
    }

    #[test]
    fn test_find_command_by_alias() {
        assert_eq!(find_command("truth").unwrap().name, "truthiness");
        assert_eq!(find_command("verify").unwrap().name, "truthiness");
        assert_eq!(find_command("factcheck").unwrap().name, "truthiness");
        assert_eq!(find_command("qc").unwrap().name, "quickcheck");
        assert_eq!(find_command("debunk").unwrap().name, "expose");
        assert_eq!(find_command("config").unwrap().name, "settings");
    }

    #[test]
    fn test_find_command_case_insensitive() {
        assert_eq!(find_command("TRUTHINESS").unwrap().name, "truthiness");
        assert_eq!(find_command("QC").unwrap().name, "quickcheck");
    }

    #[test]
    fn test_find_command_unknown() {
        assert!(find_command("fly").is_none());
        assert!(find_command("").is_none());
    }

    #[test]
    fn test_command_table_descriptions_non_empty() {
        for command in COMMANDS {
            assert!(!command.description.is_empty(), "{} lacks description", command.name);
        }
    }

}
