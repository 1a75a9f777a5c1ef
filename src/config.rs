//! Configuration for the fact-checker bot
//!
//! Compiled-in defaults, optionally overridden by a YAML file
//! (factcheck_bot.yml), then by environment variables.

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Result};

/// Default config file path (override with FACTCHECK_BOT_CONFIG).
pub const DEFAULT_CONFIG_FILE: &str = "factcheck_bot.yml";

/// Keywords that flag a message for automatic fact-checking.
pub const DEFAULT_TRIGGER_KEYWORDS: &[&str] = &[
    // Health misinformation
    "vaccine",
    "vaccines",
    "vaccination",
    "covid",
    "coronavirus",
    "hydroxychloroquine",
    "ivermectin",
    "miracle cure",
    "natural immunity",
    "microchip",
    "magnetic",
    "5g causes",
    "essential oils cure",
    // Political misinformation
    "election fraud",
    "stolen election",
    "rigged election",
    "voter fraud",
    "deep state",
    "false flag",
    "crisis actor",
    "fake news media",
    // Science misinformation
    "climate change hoax",
    "global warming fake",
    "flat earth",
    "chemtrails",
    "moon landing fake",
    "evolution hoax",
    // General misinformation patterns
    "studies show",
    "research proves",
    "scientists say",
    "doctors hate",
    "they don't want you to know",
    "hidden truth",
    "cover up",
    "government conspiracy",
    // Financial scams
    "get rich quick",
    "guaranteed profit",
    "investment opportunity",
    "crypto scam",
    "ponzi scheme",
    // Additional health claims
    "cure cancer",
    "detox",
    "cleanse",
    "alkaline water",
    "anti-aging",
    "weight loss pill",
    "burn fat fast",
];

/// Input patterns refused outright (injection attempts).
pub const DEFAULT_BLOCKED_PATTERNS: &[&str] = &[
    r"<script.*?>.*?</script>",
    r"javascript:",
    r"data:.*?base64",
    r"<iframe.*?>",
];

/// Message monitoring and command settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    pub command_prefix: String,
    pub auto_fact_check: bool,
    pub respond_to_bots: bool,
    pub trigger_keywords: Vec<String>,
    pub min_message_length: usize,
    pub max_message_length: usize,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            command_prefix: "!".to_string(),
            auto_fact_check: true,
            respond_to_bots: false,
            trigger_keywords: DEFAULT_TRIGGER_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_message_length: 20,
            max_message_length: 2000,
        }
    }
}

/// Per-user and global rate limit settings for automatic checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub max_requests: usize,
    pub time_window_secs: u64,
    pub global_per_minute: usize,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 5,
            time_window_secs: 300,
            global_per_minute: 30,
        }
    }
}

impl RateLimitSettings {
    pub fn time_window(&self) -> Duration {
        Duration::from_secs(self.time_window_secs)
    }
}

/// Gemini request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_secs: f64,
    pub min_claim_length: usize,
    pub max_claim_length: usize,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.1,
            max_tokens: 1000,
            timeout_secs: 30,
            max_retries: 2,
            retry_delay_secs: 1.0,
            min_claim_length: 10,
            max_claim_length: 1000,
        }
    }
}

impl GeminiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay_secs)
    }
}

/// How fact-check results are rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseSettings {
    pub show_confidence_score: bool,
    pub show_sources: bool,
    pub max_sources_display: usize,
}

impl Default for ResponseSettings {
    fn default() -> Self {
        Self {
            show_confidence_score: true,
            show_sources: true,
            max_sources_display: 3,
        }
    }
}

/// Input filtering and user restrictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub blocked_patterns: Vec<String>,
    pub blacklisted_users: Vec<u64>,
    pub admin_users: Vec<u64>,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            blocked_patterns: DEFAULT_BLOCKED_PATTERNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            blacklisted_users: Vec::new(),
            admin_users: Vec::new(),
        }
    }
}

/// Caching, concurrency and housekeeping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    pub max_cache_size: usize,
    pub cache_ttl_secs: u64,
    pub max_concurrent_checks: usize,
    pub rate_limit_cleanup_interval_secs: u64,
    pub cache_cleanup_interval_secs: u64,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            max_cache_size: 1000,
            cache_ttl_secs: 3600,
            max_concurrent_checks: 5,
            rate_limit_cleanup_interval_secs: 300,
            cache_cleanup_interval_secs: 600,
        }
    }
}

impl PerformanceSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Feature toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub auto_checking: bool,
    pub manual_commands: bool,
    pub rate_limiting: bool,
    pub metrics: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            auto_checking: true,
            manual_commands: true,
            rate_limiting: true,
            metrics: false,
        }
    }
}

/// Full bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bot: BotSettings,
    pub rate_limit: RateLimitSettings,
    pub gemini: GeminiSettings,
    pub response: ResponseSettings,
    pub security: SecuritySettings,
    pub performance: PerformanceSettings,
    pub features: FeatureFlags,
}

impl Config {
    /// Load configuration: defaults, then YAML file (if present), then env.
    pub fn load() -> Self {
        let path = env::var("FACTCHECK_BOT_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = if Path::new(&path).exists() {
            match Self::from_file(&path) {
                Ok(cfg) => {
                    info!("Loaded config from {}", path);
                    cfg
                }
                Err(e) => {
                    warn!("Failed to load config from {}: {}, using defaults", path, e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.apply_env();
        config
    }

    /// Parse configuration from a YAML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of the current values.
    pub fn apply_env(&mut self) {
        if let Ok(prefix) = env::var("COMMAND_PREFIX") {
            self.bot.command_prefix = prefix;
        }
        if let Some(v) = env_bool("AUTO_FACT_CHECK") {
            self.bot.auto_fact_check = v;
        }
        if let Some(v) = env_bool("RESPOND_TO_BOTS") {
            self.bot.respond_to_bots = v;
        }
        if let Some(v) = env_parse("MIN_MESSAGE_LENGTH") {
            self.bot.min_message_length = v;
        }
        if let Some(v) = env_parse("MAX_MESSAGE_LENGTH") {
            self.bot.max_message_length = v;
        }

        if let Some(v) = env_parse("RATE_LIMIT_MAX_REQUESTS") {
            self.rate_limit.max_requests = v;
        }
        if let Some(v) = env_parse("RATE_LIMIT_TIME_WINDOW") {
            self.rate_limit.time_window_secs = v;
        }
        if let Some(v) = env_parse("GLOBAL_RATE_LIMIT_PER_MINUTE") {
            self.rate_limit.global_per_minute = v;
        }

        if let Ok(model) = env::var("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(v) = env_parse("GEMINI_TEMPERATURE") {
            self.gemini.temperature = v;
        }
        if let Some(v) = env_parse("GEMINI_MAX_TOKENS") {
            self.gemini.max_tokens = v;
        }
        if let Some(v) = env_parse("FACT_CHECK_TIMEOUT") {
            self.gemini.timeout_secs = v;
        }
        if let Some(v) = env_parse("FACT_CHECK_MAX_RETRIES") {
            self.gemini.max_retries = v;
        }
        if let Some(v) = env_parse("FACT_CHECK_RETRY_DELAY") {
            self.gemini.retry_delay_secs = v;
        }
        if let Some(v) = env_parse("MIN_CLAIM_LENGTH") {
            self.gemini.min_claim_length = v;
        }
        if let Some(v) = env_parse("MAX_CLAIM_LENGTH") {
            self.gemini.max_claim_length = v;
        }

        if let Some(v) = env_bool("SHOW_CONFIDENCE_SCORE") {
            self.response.show_confidence_score = v;
        }
        if let Some(v) = env_bool("SHOW_SOURCES") {
            self.response.show_sources = v;
        }
        if let Some(v) = env_parse("MAX_SOURCES_DISPLAY") {
            self.response.max_sources_display = v;
        }

        if let Some(v) = env_id_list("BLACKLISTED_USERS") {
            self.security.blacklisted_users = v;
        }
        if let Some(v) = env_id_list("ADMIN_USERS") {
            self.security.admin_users = v;
        }

        if let Some(v) = env_parse("MAX_CACHE_SIZE") {
            self.performance.max_cache_size = v;
        }
        if let Some(v) = env_parse("CACHE_TTL") {
            self.performance.cache_ttl_secs = v;
        }
        if let Some(v) = env_parse("MAX_CONCURRENT_CHECKS") {
            self.performance.max_concurrent_checks = v;
        }
        if let Some(v) = env_parse("RATE_LIMIT_CLEANUP_INTERVAL") {
            self.performance.rate_limit_cleanup_interval_secs = v;
        }
        if let Some(v) = env_parse("CACHE_CLEANUP_INTERVAL") {
            self.performance.cache_cleanup_interval_secs = v;
        }

        if let Some(v) = env_bool("ENABLE_AUTO_CHECKING") {
            self.features.auto_checking = v;
        }
        if let Some(v) = env_bool("ENABLE_MANUAL_COMMANDS") {
            self.features.manual_commands = v;
        }
        if let Some(v) = env_bool("ENABLE_RATE_LIMITING") {
            self.features.rate_limiting = v;
        }
        if let Some(v) = env_bool("ENABLE_METRICS") {
            self.features.metrics = v;
        }
    }

    /// Validate configuration, collecting all violations.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.rate_limit.max_requests == 0 {
            errors.push("rate_limit.max_requests must be greater than 0".to_string());
        }
        if self.rate_limit.time_window_secs == 0 {
            errors.push("rate_limit.time_window_secs must be greater than 0".to_string());
        }
        if self.rate_limit.global_per_minute == 0 {
            errors.push("rate_limit.global_per_minute must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.gemini.temperature) {
            errors.push("gemini.temperature must be between 0 and 1".to_string());
        }
        if self.gemini.max_tokens == 0 {
            errors.push("gemini.max_tokens must be greater than 0".to_string());
        }
        if self.bot.command_prefix.is_empty() || self.bot.command_prefix.len() > 5 {
            errors.push("bot.command_prefix must be 1-5 characters long".to_string());
        }
        if self.gemini.min_claim_length >= self.gemini.max_claim_length {
            errors.push("gemini.min_claim_length must be below max_claim_length".to_string());
        }
        if self.response.max_sources_display == 0 {
            errors.push("response.max_sources_display must be greater than 0".to_string());
        }
        if self.performance.max_concurrent_checks == 0 {
            errors.push("performance.max_concurrent_checks must be greater than 0".to_string());
        }

        errors
    }

    /// Validate and fail with a single combined error.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidConfig(errors.join("; ")))
        }
    }

    /// Redacted configuration summary for display (no secrets).
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            command_prefix: self.bot.command_prefix.clone(),
            auto_fact_check: self.bot.auto_fact_check,
            respond_to_bots: self.bot.respond_to_bots,
            trigger_keywords_count: self.bot.trigger_keywords.len(),
            rate_limit_max_requests: self.rate_limit.max_requests,
            rate_limit_time_window_secs: self.rate_limit.time_window_secs,
            global_rate_limit_per_minute: self.rate_limit.global_per_minute,
            model: self.gemini.model.clone(),
            temperature: self.gemini.temperature,
            max_tokens: self.gemini.max_tokens,
            timeout_secs: self.gemini.timeout_secs,
            features: self.features.clone(),
        }
    }
}

/// Snapshot returned by [`Config::summary`].
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub command_prefix: String,
    pub auto_fact_check: bool,
    pub respond_to_bots: bool,
    pub trigger_keywords_count: usize,
    pub rate_limit_max_requests: usize,
    pub rate_limit_time_window_secs: u64,
    pub global_rate_limit_per_minute: usize,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub features: FeatureFlags,
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_bool(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
}

fn env_id_list(name: &str) -> Option<Vec<u64>> {
    env::var(name).ok().map(|v| {
        v.split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bot.command_prefix, "!");
        assert!(config.bot.auto_fact_check);
        assert!(!config.bot.respond_to_bots);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.time_window_secs, 300);
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.gemini.max_tokens, 1000);
        assert!(!config.features.metrics);
    }

    #[test]
    fn test_default_trigger_keywords_present() {
        let config = Config::default();
        assert!(config
            .bot
            .trigger_keywords
            .iter()
            .any(|k| k == "miracle cure"));
        assert!(config.bot.trigger_keywords.iter().any(|k| k == "flat earth"));
        assert!(config.bot.trigger_keywords.len() > 30);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_empty());
        assert!(config.ensure_valid().is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = Config::default();
        config.rate_limit.max_requests = 0;
        config.gemini.temperature = 2.0;
        config.bot.command_prefix = String::new();

        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("max_requests")));
        assert!(errors.iter().any(|e| e.contains("temperature")));
        assert!(errors.iter().any(|e| e.contains("command_prefix")));
    }

    #[test]
    fn test_ensure_valid_joins_errors() {
        let mut config = Config::default();
        config.gemini.max_tokens = 0;
        config.rate_limit.time_window_secs = 0;

        let err = config.ensure_valid().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("max_tokens"));
        assert!(msg.contains("time_window_secs"));
    }

    #[test]
    fn test_prefix_length_validation() {
        let mut config = Config::default();
        config.bot.command_prefix = "??????".to_string();
        assert!(!config.validate().is_empty());

        config.bot.command_prefix = "?".to_string();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_from_file_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "bot:\n  command_prefix: '?'\nrate_limit:\n  max_requests: 10"
        )
        .unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.bot.command_prefix, "?");
        assert_eq!(config.rate_limit.max_requests, 10);
        // Untouched sections keep defaults
        assert_eq!(config.rate_limit.time_window_secs, 300);
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bot: [not, a, map").unwrap();

        assert!(Config::from_file(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_from_file_missing() {
        assert!(Config::from_file("/nonexistent/factcheck_bot_12345.yml").is_err());
    }

    #[test]
    fn test_summary_redacts_and_counts() {
        let config = Config::default();
        let summary = config.summary();

        assert_eq!(summary.command_prefix, "!");
        assert_eq!(summary.model, "gemini-1.5-flash");
        assert_eq!(
            summary.trigger_keywords_count,
            config.bot.trigger_keywords.len()
        );

        // Summary must not leak the raw keyword list or user ids
        let yaml = serde_yaml::to_string(&summary).unwrap();
        assert!(!yaml.contains("blacklisted_users"));
    }

    #[test]
    fn test_time_window_duration() {
        let settings = RateLimitSettings::default();
        assert_eq!(settings.time_window(), Duration::from_secs(300));
    }

    #[test]
    fn test_gemini_retry_delay() {
        let settings = GeminiSettings::default();
        assert_eq!(settings.retry_delay(), Duration::from_secs_f64(1.0));
        assert_eq!(settings.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_id_list_parsing() {
        env::set_var("TEST_ID_LIST_CFG", "123, 456,abc, 789");
        let ids = env_id_list("TEST_ID_LIST_CFG").unwrap();
        env::remove_var("TEST_ID_LIST_CFG");

        assert_eq!(ids, vec![123, 456, 789]);
    }

    #[test]
    fn test_env_bool_parsing() {
        env::set_var("TEST_BOOL_CFG", "TRUE");
        assert_eq!(env_bool("TEST_BOOL_CFG"), Some(true));
        env::set_var("TEST_BOOL_CFG", "0");
        assert_eq!(env_bool("TEST_BOOL_CFG"), Some(false));
        env::remove_var("TEST_BOOL_CFG");
        assert_eq!(env_bool("TEST_BOOL_CFG"), None);
    }

    #[test]
    fn test_apply_env_overrides() {
        env::set_var("TEST_APPLY_GEMINI_MODEL_UNSET", "1");
        env::set_var("GEMINI_TEMPERATURE", "0.7");
        env::set_var("RATE_LIMIT_MAX_REQUESTS", "9");

        let mut config = Config::default();
        config.apply_env();

        env::remove_var("GEMINI_TEMPERATURE");
        env::remove_var("RATE_LIMIT_MAX_REQUESTS");
        env::remove_var("TEST_APPLY_GEMINI_MODEL_UNSET");

        assert!((config.gemini.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.rate_limit.max_requests, 9);
    }

    #[test]
    fn test_blocked_patterns_defaults() {
        let config = Config::default();
        assert_eq!(config.security.blocked_patterns.len(), 4);
        assert!(config
            .security
            .blocked_patterns
            .iter()
            .any(|p| p.contains("script")));
    }
}
