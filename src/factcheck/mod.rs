//! Fact-checking engine.
//!
//! Cleans and validates a claim, renders the prompt, calls Gemini and parses
//! the reply into a structured verdict. Concurrent API calls are bounded and
//! recent verdicts are cached.

pub mod cache;
pub mod claim;
pub mod parse;

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::config::Config;
use crate::integrations::GeminiClient;
use crate::prompts::Prompt;
use crate::{Error, Result};

pub use cache::ClaimCache;
pub use claim::{check_length, clean_claim, sanitize};
pub use parse::{
    parse_expose, parse_fact_check, truncate_chars, Accuracy, ExposeResult, ExposeType,
    FactCheckResult, Leaning,
};

/// Fact-checking engine backed by Gemini.
pub struct FactChecker {
    client: GeminiClient,
    min_claim_length: usize,
    max_claim_length: usize,
    blocked_patterns: Vec<String>,
    cache: ClaimCache,
    semaphore: Arc<Semaphore>,
}

impl FactChecker {
    pub fn new(client: GeminiClient, config: &Config) -> Self {
        info!("Fact checker initialized with model {}", client.model());
        Self {
            client,
            min_claim_length: config.gemini.min_claim_length,
            max_claim_length: config.gemini.max_claim_length,
            blocked_patterns: config.security.blocked_patterns.clone(),
            cache: ClaimCache::new(
                config.performance.max_cache_size,
                config.performance.cache_ttl(),
            ),
            semaphore: Arc::new(Semaphore::new(config.performance.max_concurrent_checks)),
        }
    }

    /// Model the checker queries.
    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Fact-check a claim and return a structured verdict.
    pub async fn check_claim(&self, claim: &str) -> Result<FactCheckResult> {
        let cleaned = self.prepare(claim)?;

        if let Some(cached) = self.cache.get(&cleaned).await {
            debug!("Cache hit for claim: {}", truncate_chars(&cleaned, 50));
            return Ok(cached);
        }

        let prompt = Prompt::FactCheck.render(&cleaned);
        let response = self.generate(&prompt).await?;
        let result = parse_fact_check(&response);

        info!(
            "Fact-check completed: {} ({}%) for claim: {}",
            result.accuracy.label(),
            result.confidence,
            truncate_chars(&cleaned, 50)
        );

        self.cache.insert(cleaned, result.clone()).await;
        Ok(result)
    }

    /// Debunk a claim, or validate it if debunking fails.
    pub async fn expose_claim(&self, claim: &str) -> Result<ExposeResult> {
        let cleaned = self.prepare(claim)?;

        let prompt = Prompt::Expose.render(&cleaned);
        let response = self.generate(&prompt).await?;
        let result = parse_expose(&response);

        info!(
            "Expose analysis completed: {} ({}%) for claim: {}",
            result.expose_type.label(),
            result.confidence,
            truncate_chars(&cleaned, 50)
        );

        Ok(result)
    }

    /// Run periodic cache housekeeping.
    pub async fn cleanup_cache(&self) {
        self.cache.cleanup().await;
    }

    fn prepare(&self, claim: &str) -> Result<String> {
        sanitize(claim, &self.blocked_patterns)?;
        let cleaned = clean_claim(claim);
        check_length(&cleaned, self.min_claim_length, self.max_claim_length)?;
        Ok(cleaned)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| Error::Unknown(format!("Semaphore closed: {}", e)))?;
        self.client.generate(prompt).await
    }
}
