//! Safety layer — everything the user pastes passes through here before
//! it is forwarded to a cloud LLM.

pub mod sanitize;

pub use sanitize::{
    has_sensitive_data, sanitize_input, sanitize_value, SanitizationResult, SanitizeError,
    INJECTION_MARKER, SENSITIVE_MARKER,
};
