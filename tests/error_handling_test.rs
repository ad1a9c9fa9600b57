#[cfg(test)]
mod tests {
    use crate::error::{AiError, CoachError};

    #[test]
    fn test_error_creation() {
        let error = CoachError::new("Test error", "test_stage");
        assert_eq!(error.message, "Test error");
        assert_eq!(error.stage, "test_stage");
        assert!(!error.retry_succeeded);
    }

    #[test]
    fn test_error_with_context() {
        let error = CoachError::new("Test error", "test_stage")
            .with_context("Additional context");
        assert!(error.context.is_some());
        assert_eq!(error.context.unwrap(), "Additional context");
    }

    #[test]
    fn test_error_display() {
        let error = CoachError::new("Test error", "test_stage")
            .with_context("context")
            .with_source("source");
        let display = format!("{}", error);
        assert_eq!(display, "[test_stage] Test error (context: context) (source: source)");
    }

    #[test]
    fn test_not_found_is_store_stage() {
        let error = CoachError::not_found("student s1");
        assert_eq!(error.stage, "store");
        assert_eq!(error.message, "student s1 not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: CoachError = io.into();
        assert_eq!(error.stage, "io");
        assert!(error.message.contains("denied"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: CoachError = parse.into();
        assert_eq!(error.stage, "json_parse");
        assert_eq!(error.source.as_deref(), Some("serde_json"));
    }

    #[test]
    fn test_ai_error_classification() {
        assert!(AiError::classify(429, "Too many requests").is_quota());
        assert!(AiError::classify(400, "status RESOURCE_EXHAUSTED").is_quota());
        assert!(matches!(
            AiError::classify(400, "API key not valid. Please pass a valid API key."),
            AiError::InvalidKey
        ));
        assert!(matches!(
            AiError::classify(500, "internal"),
            AiError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_ai_error_becomes_ai_stage() {
        let error: CoachError = AiError::InvalidKey.into();
        assert_eq!(error.stage, "ai");
        assert_eq!(error.message, "Invalid AI API key");
        assert_eq!(error.source.as_deref(), Some("API key not valid"));
    }
}
