//! Prompt templates for Gemini requests.
//!
//! Prompts live in the `prompts/` directory in the project root and can be
//! edited without recompiling; compiled-in defaults are used as fallback.
//! Templates contain a `{claim}` placeholder.

use std::path::PathBuf;

use crate::{Error, Result};

const DEFAULT_FACT_CHECK: &str = r#"You are an expert fact-checker. Please analyze the following claim thoroughly and provide a comprehensive fact-check.

CLAIM TO ANALYZE:
"{claim}"

Please provide your analysis in the following structured format:

ACCURACY: [True/Mostly True/Mixed/Mostly False/False/Insufficient Evidence]

CONFIDENCE: [0-100]% (How confident are you in this assessment?)

EXPLANATION: [Provide a detailed explanation of your fact-check, including:
- What aspects of the claim are accurate or inaccurate
- What evidence supports or contradicts the claim
- Any important context or nuances
- Why you reached this conclusion]

SOURCES: [List 2-4 reliable sources that support your analysis, if available. Format as brief descriptions rather than URLs]

IMPORTANT GUIDELINES:
- Be objective and evidence-based
- Consider multiple perspectives
- Distinguish between facts and opinions
- Note any missing context that affects accuracy
- If the claim is too vague or subjective to fact-check, indicate this
- For claims about current events, acknowledge if information may be rapidly evolving
- Be precise about what exactly is true or false in complex claims
"#;

const DEFAULT_EXPOSE: &str = r#"You are a fact-checking expert specializing in exposing misinformation and debunking false claims.

Your task is to analyze the following claim and either:
1. DEBUNK it if it's false or misleading (provide strong evidence against it)
2. SUPPORT it if it's actually true and cannot be debunked (provide evidence for it)

Claim to analyze: "{claim}"

Provide your response in this exact JSON format:
{
    "expose_type": "debunked" or "supported",
    "confidence": confidence_percentage_as_integer,
    "analysis": "detailed_analysis_explanation",
    "evidence": ["evidence_point_1", "evidence_point_2", "evidence_point_3"]
}

Be thorough, factual, and cite reliable sources when possible.
"#;

/// Available prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Comprehensive truthiness analysis (structured sections).
    FactCheck,
    /// Aggressive debunk-or-support analysis (JSON reply).
    Expose,
}

impl Prompt {
    /// Prompt file name (Markdown).
    pub fn filename(&self) -> &'static str {
        match self {
            Prompt::FactCheck => "fact_check.md",
            Prompt::Expose => "expose.md",
        }
    }

    /// Compiled-in default template.
    pub fn default_text(&self) -> &'static str {
        match self {
            Prompt::FactCheck => DEFAULT_FACT_CHECK,
            Prompt::Expose => DEFAULT_EXPOSE,
        }
    }

    /// Load the template, falling back to the compiled-in default.
    pub fn load(&self) -> String {
        load_prompt(self.filename()).unwrap_or_else(|_| self.default_text().to_string())
    }

    /// Load the template and substitute the claim.
    pub fn render(&self, claim: &str) -> String {
        self.load().replace("{claim}", claim)
    }
}

/// Load a prompt by file name.
pub fn load_prompt(filename: &str) -> Result<String> {
    let path = prompts_dir().join(filename);
    std::fs::read_to_string(&path)
        .map_err(|e| Error::InvalidArgument(format!("Failed to load prompt {}: {}", filename, e)))
}

/// Path to the prompts directory.
pub fn prompts_dir() -> PathBuf {
    // Look for prompts/ relative to the current or parent directory
    let candidates = [
        PathBuf::from("prompts"),
        PathBuf::from("../prompts"),
        PathBuf::from("../../prompts"),
    ];

    for path in candidates {
        if path.exists() {
            return path;
        }
    }

    // Fallback
    PathBuf::from("prompts")
}

/// All available prompts.
pub fn list_prompts() -> Vec<Prompt> {
    vec![Prompt::FactCheck, Prompt::Expose]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_filenames() {
        assert_eq!(Prompt::FactCheck.filename(), "fact_check.md");
        assert_eq!(Prompt::Expose.filename(), "expose.md");
    }

    #[test]
    fn test_all_prompt_filenames_are_md() {
        for prompt in list_prompts() {
            assert!(
                prompt.filename().ends_with(".md"),
                "Prompt {:?} should have .md extension",
                prompt
            );
        }
    }

    #[test]
    fn test_render_substitutes_claim() {
        let rendered = Prompt::FactCheck.render("the moon is made of cheese");
        assert!(rendered.contains("the moon is made of cheese"));
        assert!(!rendered.contains("{claim}"));
    }

    #[test]
    fn test_fact_check_default_has_sections() {
        let text = Prompt::FactCheck.default_text();
        assert!(text.contains("ACCURACY:"));
        assert!(text.contains("CONFIDENCE:"));
        assert!(text.contains("EXPLANATION:"));
        assert!(text.contains("SOURCES:"));
    }

    #[test]
    fn test_expose_default_requests_json() {
        let text = Prompt::Expose.default_text();
        assert!(text.contains("expose_type"));
        assert!(text.contains("\"debunked\" or \"supported\""));
        assert!(text.contains("evidence"));
    }

    #[test]
    fn test_load_prompt_nonexistent_file() {
        let result = load_prompt("nonexistent_file_12345.md");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_falls_back_to_default() {
        // Whether or not prompts/ exists, load() must return usable text
        let text = Prompt::Expose.load();
        assert!(text.contains("{claim}") || text.contains("Claim to analyze"));
    }

    #[test]
    fn test_prompts_dir_returns_path() {
        let dir = prompts_dir();
        assert!(!dir.as_os_str().is_empty());
    }

    #[test]
    fn test_list_prompts() {
        assert_eq!(list_prompts().len(), 2);
    }
}
