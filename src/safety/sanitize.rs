//! Input sanitization — masks secrets and neutralizes prompt-injection
//! phrasing before technical context is forwarded to a cloud LLM.
//!
//! Two passes over the text:
//! 1. Injection phrases are replaced with [`INJECTION_MARKER`].
//! 2. Secret-like substrings are replaced with [`SENSITIVE_MARKER`].
//!
//! Over-masking is acceptable here: the sanitized text only ever goes to
//! the LLM and is never turned back into anything executable.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Replacement for a detected prompt-injection phrase.
pub const INJECTION_MARKER: &str = "[REDACTED_SYSTEM_OVERRIDE_ATTEMPT]";

/// Replacement for a detected secret.
pub const SENSITIVE_MARKER: &str = "[MASKED_SENSITIVE_DATA]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizationResult {
    pub sanitized: String,
    pub masked_count: usize,
    pub injection_detected: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

static INJECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)ignore (all )?previous instructions",
        r"(?i)system override",
        r"(?i)you are now a",
        r"(?i)regardless of any previous",
        r"(?i)forget everything",
        r"(?i)stop what you are doing",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SENSITIVE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // Google AI / Gemini keys
        (
            Regex::new(r"AIzaSy[A-Za-z0-9_-]{33}").unwrap(),
            "google_key",
        ),
        // AWS access keys
        (Regex::new(r"AKIA[0-9A-Z]{16}").unwrap(), "aws_key"),
        // PEM private key blocks, BEGIN through the nearest END
        (
            Regex::new(r"-----BEGIN [A-Z ]+ PRIVATE KEY-----[\s\S]*?-----END [A-Z ]+ PRIVATE KEY-----")
                .unwrap(),
            "private_key",
        ),
        // Stripe secret keys
        (
            Regex::new(r"sk_(live|test)_[0-9a-zA-Z]{24}").unwrap(),
            "stripe_key",
        ),
        // name=value / name: value assignments
        (
            Regex::new(
                r#"(?i)(password|secret|key|token|auth|pwd|pass)["']?\s*[:=]\s*["']?([A-Za-z0-9/+=_.-]{8,})["']?"#,
            )
            .unwrap(),
            "generic_secret",
        ),
    ]
});

/// Sanitize free-form text before it leaves the machine.
///
/// Injection phrases are redacted first so the secret pass runs over the
/// already-redacted string. `masked_count` counts secret matches only.
pub fn sanitize_input(text: &str) -> SanitizationResult {
    let mut sanitized = text.to_string();
    let mut masked_count = 0;
    let mut injection_detected = false;

    for pattern in INJECTION_PATTERNS.iter() {
        if pattern.is_match(&sanitized) {
            injection_detected = true;
            sanitized = pattern
                .replace_all(&sanitized, INJECTION_MARKER)
                .into_owned();
        }
    }

    let mut hits = Vec::new();
    for (pattern, label) in SENSITIVE_PATTERNS.iter() {
        let count = pattern.find_iter(&sanitized).count();
        if count > 0 {
            masked_count += count;
            hits.push(format!("{} {}", count, label));
            sanitized = pattern
                .replace_all(&sanitized, SENSITIVE_MARKER)
                .into_owned();
        }
    }

    if injection_detected {
        log::warn!("[SAFETY] Prompt-injection phrasing neutralized");
    }
    if !hits.is_empty() {
        log::info!("[SAFETY] Masked {}", hits.join(", "));
    }

    SanitizationResult {
        sanitized,
        masked_count,
        injection_detected,
    }
}

/// Pre-flight check: does `text` contain anything the secret pass would mask?
///
/// Read-only; injection phrases are not considered.
pub fn has_sensitive_data(text: &str) -> bool {
    SENSITIVE_PATTERNS
        .iter()
        .any(|(pattern, _)| pattern.is_match(text))
}

/// Sanitize a loosely-typed value, e.g. a field lifted out of an IPC payload.
pub fn sanitize_value(value: &serde_json::Value) -> Result<SanitizationResult, SanitizeError> {
    match value {
        serde_json::Value::String(text) => Ok(sanitize_input(text)),
        other => Err(SanitizeError::InvalidArgument(format!(
            "expected a string, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
