//! Parsing of Gemini replies into structured verdicts.
//!
//! Fact-check replies use labeled sections (ACCURACY/CONFIDENCE/EXPLANATION/
//! SOURCES); expose replies are JSON with a regex fallback for malformed
//! output. Parsing is total: garbage degrades to Unknown, never an error.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Accuracy verdict for a fact-checked claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accuracy {
    True,
    MostlyTrue,
    Mixed,
    MostlyFalse,
    False,
    InsufficientEvidence,
    Unknown,
}

impl Accuracy {
    /// Parse a verdict label, case-insensitively.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "true" => Accuracy::True,
            "mostly true" => Accuracy::MostlyTrue,
            "mixed" | "partially true" => Accuracy::Mixed,
            "mostly false" => Accuracy::MostlyFalse,
            "false" => Accuracy::False,
            "insufficient evidence" => Accuracy::InsufficientEvidence,
            _ => Accuracy::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Accuracy::True => "True",
            Accuracy::MostlyTrue => "Mostly True",
            Accuracy::Mixed => "Mixed",
            Accuracy::MostlyFalse => "Mostly False",
            Accuracy::False => "False",
            Accuracy::InsufficientEvidence => "Insufficient Evidence",
            Accuracy::Unknown => "Unknown",
        }
    }

    /// Leaning of the verdict, used for embed colors and quick-check emoji.
    pub fn leaning(&self) -> Leaning {
        match self {
            Accuracy::True | Accuracy::MostlyTrue => Leaning::Accurate,
            Accuracy::False | Accuracy::MostlyFalse => Leaning::Inaccurate,
            Accuracy::Mixed => Leaning::Mixed,
            Accuracy::InsufficientEvidence | Accuracy::Unknown => Leaning::Uncertain,
        }
    }
}

/// Coarse grouping of accuracy verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leaning {
    Accurate,
    Inaccurate,
    Mixed,
    Uncertain,
}

/// Result of a comprehensive fact-check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCheckResult {
    pub accuracy: Accuracy,
    pub confidence: u8,
    pub explanation: String,
    pub sources: Vec<String>,
}

/// Expose analysis outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposeType {
    Debunked,
    Supported,
    Unknown,
}

impl ExposeType {
    pub fn parse(s: &str) -> Self {
        let lower = s.to_lowercase();
        if lower.contains("debunked") {
            ExposeType::Debunked
        } else if lower.contains("supported") {
            ExposeType::Supported
        } else {
            ExposeType::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExposeType::Debunked => "Debunked",
            ExposeType::Supported => "Supported",
            ExposeType::Unknown => "Unknown",
        }
    }
}

/// Result of an expose (debunk-or-support) analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposeResult {
    pub expose_type: ExposeType,
    pub confidence: u8,
    pub analysis: String,
    pub evidence: Vec<String>,
}

static ACCURACY_RE: Lazy<Regex> = Lazy::new(|| ci(r"ACCURACY:\s*([^\n]+)"));
static CONFIDENCE_RE: Lazy<Regex> = Lazy::new(|| ci(r"CONFIDENCE:\s*(\d+)"));
static EXPLANATION_RE: Lazy<Regex> = Lazy::new(|| ci_dotall(r"EXPLANATION:\s*(.*?)(?:SOURCES:|\z)"));
static SOURCES_RE: Lazy<Regex> = Lazy::new(|| ci_dotall(r"SOURCES:\s*(.*)\z"));
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-•*\d.)\s]+").unwrap());
static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)%").unwrap());

fn ci(pattern: &str) -> Regex {
    RegexBuilder::new(pattern).case_insensitive(true).build().unwrap()
}

fn ci_dotall(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .unwrap()
}

/// Parse the structured fact-check reply.
pub fn parse_fact_check(response: &str) -> FactCheckResult {
    let accuracy = ACCURACY_RE
        .captures(response)
        .map(|c| Accuracy::parse(&c[1]))
        .unwrap_or(Accuracy::Unknown);

    let confidence = CONFIDENCE_RE
        .captures(response)
        .and_then(|c| c[1].parse::<u32>().ok())
        .map(|v| v.min(100) as u8)
        .unwrap_or(0);

    let explanation = EXPLANATION_RE
        .captures(response)
        .map(|c| collapse(&c[1]))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            // No structure at all: fall back to the raw reply
            if ACCURACY_RE.is_match(response) {
                String::new()
            } else {
                truncate_chars(response, 500)
            }
        });

    let sources = SOURCES_RE
        .captures(response)
        .map(|c| parse_source_lines(&c[1]))
        .unwrap_or_default();

    FactCheckResult {
        accuracy,
        confidence,
        explanation,
        sources,
    }
}

/// Parse the expose reply: JSON first, regex fallback for malformed output.
pub fn parse_expose(response: &str) -> ExposeResult {
    if let Some(result) = parse_expose_json(response) {
        return result;
    }

    // Fallback: extract what we can from free-form text
    let expose_type = ExposeType::parse(response);
    let confidence = PERCENT_RE
        .captures(response)
        .and_then(|c| c[1].parse::<u32>().ok())
        .map(|v| v.min(100) as u8)
        .unwrap_or(50);

    ExposeResult {
        expose_type,
        confidence,
        analysis: truncate_chars(response, 500),
        evidence: Vec::new(),
    }
}

#[derive(Debug, Deserialize)]
struct ExposeJson {
    expose_type: Option<String>,
    confidence: Option<u32>,
    analysis: Option<String>,
    #[serde(default)]
    evidence: Vec<String>,
}

fn parse_expose_json(response: &str) -> Option<ExposeResult> {
    let body = strip_code_fence(response);
    let parsed: ExposeJson = serde_json::from_str(body).ok()?;

    Some(ExposeResult {
        expose_type: parsed
            .expose_type
            .as_deref()
            .map(ExposeType::parse)
            .unwrap_or(ExposeType::Unknown),
        confidence: parsed.confidence.map(|v| v.min(100) as u8).unwrap_or(0),
        analysis: parsed.analysis.unwrap_or_default(),
        evidence: parsed.evidence,
    })
}

/// Strip a surrounding ```json ... ``` fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_source_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.to_lowercase().starts_with("important"))
        .map(|line| BULLET_RE.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .take(4)
        .collect()
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Char-boundary-safe truncation with an ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
