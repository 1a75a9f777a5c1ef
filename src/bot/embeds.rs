//! Discord embed builders for fact-check responses.

use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter};

use crate::config::{Config, ResponseSettings};
use crate::factcheck::{truncate_chars, Accuracy, ExposeResult, ExposeType, FactCheckResult, Leaning};
use crate::rate_limit::RateLimiterStats;

pub const COLOR_BLUE: u32 = 0x3498db;
pub const COLOR_GREEN: u32 = 0x2ecc71;
pub const COLOR_RED: u32 = 0xe74c3c;
pub const COLOR_ORANGE: u32 = 0xf39c12;

const MAX_FIELD_LENGTH: usize = 1024;
const CLAIM_PREVIEW_LENGTH: usize = 100;

/// Embed color for an accuracy verdict.
pub fn accuracy_colour(accuracy: Accuracy) -> Colour {
    match accuracy.leaning() {
        Leaning::Accurate => Colour::new(COLOR_GREEN),
        Leaning::Inaccurate => Colour::new(COLOR_RED),
        Leaning::Mixed => Colour::new(COLOR_ORANGE),
        Leaning::Uncertain => Colour::new(COLOR_BLUE),
    }
}

/// Human-readable model label, e.g. "gemini-1.5-flash" -> "Gemini 1.5 Flash".
pub fn model_label(model: &str) -> String {
    model
        .split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) if first.is_alphabetic() => {
                    first.to_uppercase().collect::<String>() + chars.as_str()
                }
                _ => part.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn footer(model: &str) -> CreateEmbedFooter {
    CreateEmbedFooter::new(format!(
        "Powered by {} | Results may not be 100% accurate",
        model_label(model)
    ))
}

fn claim_preview(claim: &str) -> String {
    truncate_chars(claim, CLAIM_PREVIEW_LENGTH)
}

/// Embed for a comprehensive truthiness analysis.
pub fn truthiness_embed(
    claim: &str,
    result: &FactCheckResult,
    auto_check: bool,
    model: &str,
    response: &ResponseSettings,
) -> CreateEmbed {
    let title = if auto_check {
        "🔍 Truthiness Analysis (Auto)"
    } else {
        "🔍 Truthiness Analysis"
    };

    let mut embed = CreateEmbed::new()
        .title(title)
        .colour(accuracy_colour(result.accuracy))
        .field("📝 Claim", format!("```{}```", claim_preview(claim)), false)
        .field("🎯 Assessment", format!("**{}**", result.accuracy.label()), true);

    if response.show_confidence_score {
        embed = embed.field(
            "📊 Truth Percentage",
            format!("{}%", result.confidence),
            true,
        );
    }

    embed = embed.field("🤖 AI Model", model_label(model), true);

    if !result.explanation.is_empty() {
        embed = embed.field(
            "💭 Explanation",
            truncate_chars(&result.explanation, MAX_FIELD_LENGTH),
            false,
        );
    }

    if response.show_sources && !result.sources.is_empty() {
        let shown = response.max_sources_display.min(result.sources.len());
        let mut sources_text = result.sources[..shown]
            .iter()
            .map(|s| format!("• {}", s))
            .collect::<Vec<_>>()
            .join("\n");
        if result.sources.len() > shown {
            sources_text.push_str(&format!("\n... and {} more", result.sources.len() - shown));
        }
        embed = embed.field("📚 Sources", sources_text, false);
    }

    embed.footer(footer(model))
}

/// Embed for an expose (debunk-or-support) analysis.
pub fn expose_embed(claim: &str, result: &ExposeResult, model: &str) -> CreateEmbed {
    let (title, colour) = match result.expose_type {
        ExposeType::Debunked => ("🔥 Claim Exposed & Debunked", Colour::new(COLOR_RED)),
        ExposeType::Supported => ("✅ Claim Validated & Supported", Colour::new(COLOR_GREEN)),
        ExposeType::Unknown => ("🔍 Expose Analysis", Colour::new(COLOR_BLUE)),
    };

    let mut embed = CreateEmbed::new()
        .title(title)
        .colour(colour)
        .field("📝 Claim", format!("```{}```", claim_preview(claim)), false)
        .field("🎯 Result", format!("**{}**", result.expose_type.label()), true)
        .field("📊 Confidence", format!("{}%", result.confidence), true)
        .field("🤖 AI Model", model_label(model), true);

    if !result.analysis.is_empty() {
        embed = embed.field(
            "🔍 Analysis",
            truncate_chars(&result.analysis, MAX_FIELD_LENGTH),
            false,
        );
    }

    if !result.evidence.is_empty() {
        let shown = 3.min(result.evidence.len());
        let mut evidence_text = result.evidence[..shown]
            .iter()
            .map(|e| format!("• {}", e))
            .collect::<Vec<_>>()
            .join("\n");
        if result.evidence.len() > shown {
            evidence_text.push_str(&format!(
                "\n... and {} more",
                result.evidence.len() - shown
            ));
        }
        embed = embed.field("📚 Evidence", evidence_text, false);
    }

    embed.footer(footer(model))
}

/// Compact embed for quick checks.
pub fn quick_check_embed(result: &FactCheckResult) -> CreateEmbed {
    let (emoji, colour) = match result.accuracy.leaning() {
        Leaning::Accurate => ("✅", Colour::new(COLOR_GREEN)),
        Leaning::Inaccurate => ("❌", Colour::new(COLOR_RED)),
        Leaning::Mixed => ("⚠️", Colour::new(COLOR_ORANGE)),
        Leaning::Uncertain => ("❓", Colour::new(COLOR_BLUE)),
    };

    let mut embed = CreateEmbed::new()
        .title(format!("{} Quick Check Result", emoji))
        .description(format!(
            "**Assessment:** {}\n**Confidence:** {}%",
            result.accuracy.label(),
            result.confidence
        ))
        .colour(colour);

    if !result.explanation.is_empty() {
        embed = embed.field(
            "Brief Explanation",
            truncate_chars(&result.explanation, 200),
            false,
        );
    }

    embed
}

/// Usage embed shown when a command is invoked without a claim.
pub fn usage_embed(title: &str, description: String) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(Colour::new(COLOR_BLUE))
}

/// Generic red error embed.
pub fn error_embed(title: &str, description: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description.to_string())
        .colour(Colour::new(COLOR_RED))
}

/// Cooldown refusal embed.
pub fn cooldown_embed(retry_after: f64) -> CreateEmbed {
    CreateEmbed::new()
        .title("⏰ Cooldown Active")
        .description(format!(
            "Please wait {:.1} seconds before using this command again.",
            retry_after
        ))
        .colour(Colour::new(COLOR_ORANGE))
}

/// General help embed.
pub fn help_embed(prefix: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("🔍 Discord Fact-Checker Bot")
        .description("I help combat misinformation by fact-checking claims using AI.")
        .colour(Colour::new(COLOR_BLUE))
        .field(
            "📋 Main Commands",
            format!(
                "`{p}truthiness <claim>` - Comprehensive truthiness analysis\n\
                 `{p}quickcheck <claim>` - Quick fact-check\n\
                 `{p}expose <claim>` - Debunk or validate claims\n\
                 `{p}settings` - View bot settings (Admin)\n\
                 `{p}help` - Show this help message",
                p = prefix
            ),
            false,
        )
        .field(
            "🤖 Auto Fact-Checking",
            "I automatically check messages that contain potential misinformation keywords or patterns.",
            false,
        )
        .field(
            "⚡ Rate Limits",
            "Commands have cooldowns to prevent spam and manage API usage.",
            false,
        )
        .field(
            "🔗 Example",
            format!("`{}truthiness Vaccines contain microchips`", prefix),
            false,
        )
        .footer(CreateEmbedFooter::new(
            "Powered by Gemini 1.5 | Results may not be 100% accurate",
        ))
}

/// Help embed for a single command.
pub fn command_help_embed(name: &str, description: &str, aliases: &[&str]) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("Help: {}", name))
        .description(description.to_string())
        .colour(Colour::new(COLOR_BLUE));

    if !aliases.is_empty() {
        embed = embed.field(
            "Aliases",
            aliases
                .iter()
                .map(|a| format!("`{}`", a))
                .collect::<Vec<_>>()
                .join(", "),
            false,
        );
    }

    embed
}

/// Current settings embed (admin command).
pub fn settings_embed(config: &Config) -> CreateEmbed {
    CreateEmbed::new()
        .title("⚙️ Bot Settings")
        .description("Current configuration for this server")
        .colour(Colour::new(COLOR_BLUE))
        .field(
            "Auto Fact-Check",
            if config.bot.auto_fact_check {
                "✅ Enabled"
            } else {
                "❌ Disabled"
            },
            true,
        )
        .field(
            "Command Prefix",
            format!("`{}`", config.bot.command_prefix),
            true,
        )
        .field(
            "Rate Limit",
            format!(
                "{} requests per {}s",
                config.rate_limit.max_requests, config.rate_limit.time_window_secs
            ),
            true,
        )
        .field(
            "Trigger Keywords",
            format!("{} keywords configured", config.bot.trigger_keywords.len()),
            true,
        )
        .field(
            "Respond to Bots",
            if config.bot.respond_to_bots {
                "✅ Yes"
            } else {
                "❌ No"
            },
            true,
        )
        .field("Model", config.gemini.model.clone(), true)
}

/// Bot statistics embed.
#[allow(clippy::too_many_arguments)]
pub fn stats_embed(
    guilds: usize,
    users: usize,
    checks_completed: u64,
    helpful: u64,
    not_helpful: u64,
    limiter_stats: &RateLimiterStats,
    uptime_secs: u64,
) -> CreateEmbed {
    CreateEmbed::new()
        .title("📊 Bot Statistics")
        .colour(Colour::new(COLOR_BLUE))
        .field("Servers", guilds.to_string(), true)
        .field("Users", users.to_string(), true)
        .field("Uptime", format_uptime(uptime_secs), true)
        .field("Checks Completed", checks_completed.to_string(), true)
        .field(
            "Feedback",
            format!("👍 {} / 👎 {}", helpful, not_helpful),
            true,
        )
        .field(
            "Active Limited Users",
            limiter_stats.active_users.to_string(),
            true,
        )
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
