//! Error types for the fact-checker bot

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Gemini API error: {0}")]
    GeminiError(String),

    #[error("Discord API error: {0}")]
    DiscordError(String),

    #[error("Claim is too short to analyze ({0} characters)")]
    ClaimTooShort(usize),

    #[error("Claim is too long to analyze ({0} characters)")]
    ClaimTooLong(usize),

    #[error("Claim contains blocked content")]
    BlockedContent,

    #[error("Rate limited, retry in {retry_after:.1}s")]
    RateLimited { retry_after: f64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<serenity::Error> for Error {
    fn from(err: serenity::Error) -> Self {
        Error::DiscordError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_env() {
        let err = Error::MissingEnv("DISCORD_TOKEN".to_string());
        assert!(err.to_string().contains("Missing environment variable"));
        assert!(err.to_string().contains("DISCORD_TOKEN"));
    }

    #[test]
    fn test_error_display_invalid_config() {
        let err = Error::InvalidConfig("RATE_LIMIT_MAX_REQUESTS must be greater than 0".to_string());
        assert!(err.to_string().contains("Invalid configuration"));
        assert!(err.to_string().contains("RATE_LIMIT_MAX_REQUESTS"));
    }

    #[test]
    fn test_error_display_gemini_error() {
        let err = Error::GeminiError("quota exceeded".to_string());
        assert!(err.to_string().contains("Gemini"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_error_display_claim_too_short() {
        let err = Error::ClaimTooShort(4);
        let msg = err.to_string();
        assert!(msg.contains("too short"));
        assert!(msg.contains('4'));
    }

    #[test]
    fn test_error_display_claim_too_long() {
        let err = Error::ClaimTooLong(1500);
        let msg = err.to_string();
        assert!(msg.contains("too long"));
        assert!(msg.contains("1500"));
    }

    #[test]
    fn test_error_display_blocked_content() {
        let err = Error::BlockedContent;
        assert!(err.to_string().contains("blocked content"));
    }

    #[test]
    fn test_error_display_rate_limited() {
        let err = Error::RateLimited { retry_after: 12.34 };
        let msg = err.to_string();
        assert!(msg.contains("Rate limited"));
        assert!(msg.contains("12.3"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();

        assert!(matches!(err, Error::SerializationError(_)));
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_error_from_serde_yaml() {
        let yaml_err = serde_yaml::from_str::<Vec<i32>>("not: [a, list").unwrap_err();
        let err: Error = yaml_err.into();

        assert!(matches!(err, Error::SerializationError(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(Error::Unknown("test".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }

    #[test]
    fn test_error_debug_impl() {
        let err = Error::BlockedContent;
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("BlockedContent"));
    }

    #[test]
    fn test_error_all_variants_display_non_empty() {
        let variants: Vec<Error> = vec![
            Error::MissingEnv("VAR".to_string()),
            Error::InvalidConfig("bad".to_string()),
            Error::GeminiError("api".to_string()),
            Error::DiscordError("gateway".to_string()),
            Error::ClaimTooShort(1),
            Error::ClaimTooLong(9999),
            Error::BlockedContent,
            Error::RateLimited { retry_after: 1.0 },
            Error::SerializationError("serial".to_string()),
            Error::InvalidArgument("arg".to_string()),
            Error::Unknown("unknown".to_string()),
        ];

        for err in variants {
            assert!(!err.to_string().is_empty());
        }
    }
}
