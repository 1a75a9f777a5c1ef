//! Claim text preparation.
//!
//! Strips Discord markup before a claim is sent to the model, and refuses
//! input matching the configured blocked patterns.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::{Error, Result};

static MENTIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<@[!&]?\d+>").unwrap());
static CHANNELS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<#\d+>").unwrap());
static CUSTOM_EMOJI: Lazy<Regex> = Lazy::new(|| Regex::new(r"<a?:\w+:\d+>").unwrap());
static CODE_BLOCKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[\s\S]*?```").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]*`").unwrap());
static BOLD_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{1,2}([^*]*)\*{1,2}").unwrap());
static UNDERLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{1,2}([^_]*)_{1,2}").unwrap());
static STRIKETHROUGH: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~([^~]*)~~").unwrap());

/// Remove Discord mentions and markdown, collapse whitespace.
pub fn clean_claim(claim: &str) -> String {
    let claim = MENTIONS.replace_all(claim, "");
    let claim = CHANNELS.replace_all(&claim, "");
    let claim = CUSTOM_EMOJI.replace_all(&claim, "");
    let claim = CODE_BLOCKS.replace_all(&claim, "");
    let claim = INLINE_CODE.replace_all(&claim, "");
    let claim = BOLD_ITALIC.replace_all(&claim, "$1");
    let claim = UNDERLINE.replace_all(&claim, "$1");
    let claim = STRIKETHROUGH.replace_all(&claim, "$1");

    claim.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Refuse input matching any blocked pattern (case-insensitive).
pub fn sanitize(text: &str, blocked_patterns: &[String]) -> Result<()> {
    for pattern in blocked_patterns {
        let re = match RegexBuilder::new(pattern)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
        {
            Ok(re) => re,
            Err(_) => continue, // bad user-supplied pattern, skip it
        };

        if re.is_match(text) {
            return Err(Error::BlockedContent);
        }
    }
    Ok(())
}

/// Validate claim length bounds after cleaning.
pub fn check_length(claim: &str, min: usize, max: usize) -> Result<()> {
    let len = claim.chars().count();
    if len < min {
        return Err(Error::ClaimTooShort(len));
    }
    if len > max {
        return Err(Error::ClaimTooLong(len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BLOCKED_PATTERNS;

    fn blocked() -> Vec<String> {
        DEFAULT_BLOCKED_PATTERNS
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_strips_user_mentions() {
        assert_eq!(clean_claim("<@123456> said the earth is flat"), "said the earth is flat");
        assert_eq!(clean_claim("<@!98765> hello"), "hello");
        assert_eq!(clean_claim("<@&444> role ping"), "role ping");
    }

    #[test]
    fn test_strips_channel_references() {
        assert_eq!(clean_claim("see <#1234567> for details"), "see for details");
    }

    #[test]
    fn test_strips_custom_emoji() {
        assert_eq!(clean_claim("totally true <:kappa:123>"), "totally true");
        assert_eq!(clean_claim("animated <a:party:456> one"), "animated one");
    }

    #[test]
    fn test_strips_code_blocks() {
        let input = "claim before ```rust\nlet x = 1;\n``` claim after";
        assert_eq!(clean_claim(input), "claim before claim after");
    }

    #[test]
    fn test_strips_inline_code() {
        assert_eq!(clean_claim("the `secret` variable"), "the variable");
    }

    #[test]
    fn test_unwraps_bold_and_italic() {
        assert_eq!(clean_claim("this is **very** important"), "this is very important");
        assert_eq!(clean_claim("this is *slightly* important"), "this is slightly important");
    }

    #[test]
    fn test_unwraps_underline() {
        assert_eq!(clean_claim("an __underlined__ word"), "an underlined word");
        assert_eq!(clean_claim("an _italic_ word"), "an italic word");
    }

    #[test]
    fn test_unwraps_strikethrough() {
        assert_eq!(clean_claim("no ~~longer~~ true"), "no longer true");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(clean_claim("  too   many\n\nspaces\there "), "too many spaces here");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(
            clean_claim("drinking eight glasses of water daily is necessary"),
            "drinking eight glasses of water daily is necessary"
        );
    }

    #[test]
    fn test_sanitize_blocks_script_tags() {
        let err = sanitize("<script>alert(1)</script>", &blocked()).unwrap_err();
        assert!(matches!(err, Error::BlockedContent));
    }

    #[test]
    fn test_sanitize_blocks_javascript_urls() {
        assert!(sanitize("click javascript:void(0)", &blocked()).is_err());
    }

    #[test]
    fn test_sanitize_blocks_data_urls() {
        assert!(sanitize("img data:image/png;base64,AAAA", &blocked()).is_err());
    }

    #[test]
    fn test_sanitize_blocks_iframes() {
        assert!(sanitize("<iframe src='http://evil'>", &blocked()).is_err());
    }

    #[test]
    fn test_sanitize_allows_normal_text() {
        assert!(sanitize("vaccines cause magnetism, I read it online", &blocked()).is_ok());
    }

    #[test]
    fn test_sanitize_skips_invalid_patterns() {
        let patterns = vec!["[unclosed".to_string()];
        assert!(sanitize("anything", &patterns).is_ok());
    }

    #[test]
    fn test_check_length_bounds() {
        assert!(matches!(
            check_length("short", 10, 1000),
            Err(Error::ClaimTooShort(5))
        ));
        let long = "x".repeat(1001);
        assert!(matches!(
            check_length(&long, 10, 1000),
            Err(Error::ClaimTooLong(1001))
        ));
        assert!(check_length("a perfectly sized claim", 10, 1000).is_ok());
    }
}
