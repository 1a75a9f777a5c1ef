//! Discord Fact-Checker Bot Library
//!
//! This library provides tools to:
//! - Monitor Discord messages for likely misinformation (keyword + pattern triggers)
//! - Fact-check claims with the Google Gemini API and parse structured verdicts
//! - Debunk or validate claims on demand (expose analysis)
//! - Rate-limit AI usage per user and globally, with per-command cooldowns
//! - Render fact-check results as Discord embeds with feedback buttons
//! - Expose Prometheus metrics for check volume and latency

pub mod bot;
pub mod config;
pub mod error;
pub mod factcheck;
pub mod integrations;
pub mod metrics;
pub mod prompts;
pub mod rate_limit;
pub mod triggers;

// Re-export common types
pub use config::Config;
pub use error::{Error, Result};
pub use factcheck::{Accuracy, ExposeResult, ExposeType, FactCheckResult, FactChecker};
pub use integrations::GeminiClient;
pub use prompts::{load_prompt, Prompt};
pub use rate_limit::{Cooldowns, GlobalRateLimiter, RateLimiter};
pub use triggers::TriggerScanner;
