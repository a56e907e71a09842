//! Shared utility functions used across the codebase.

/// Visible prefix length for redacted tokens (`sk-ant-oat01`).
const REDACTED_PREFIX_CHARS: usize = 12;

/// Shorten a secret to a recognisable prefix for logs and `Debug` output.
///
/// Tokens no longer than the prefix are hidden entirely.
pub fn redact_token(token: &str) -> String {
    if token.chars().count() <= REDACTED_PREFIX_CHARS {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(REDACTED_PREFIX_CHARS).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_token_keeps_prefix_only() {
        assert_eq!(
            redact_token("sk-ant-REDACTED"),
            "sk-ant-oat01..."
        );
    }

    #[test]
    fn redact_token_hides_short_values() {
        assert_eq!(redact_token(""), "***");
        assert_eq!(redact_token("A2"), "***");
        assert_eq!(redact_token("sk-ant-oat01"), "***");
    }

    #[test]
    fn redact_token_respects_char_boundaries() {
        assert_eq!(redact_token("ééééééééééééééé"), "éééééééééééé...");
    }
}
