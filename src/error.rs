use std::fmt;

use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `authstate`.
///
/// Library callers can match on these to decide recovery strategy. The sweeper
/// absorbs [`StateError`] and per-key [`StoreError`]s itself; they only reach a
/// caller through direct calls.
#[derive(Debug, Error)]
pub enum AuthStateError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── State entity ─────────────────────────────────────────────────────
    #[error("state: {0}")]
    State(#[from] StateError),

    // ── Key-value store ──────────────────────────────────────────────────
    #[error("store: {0}")]
    Store(#[from] StoreError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── State errors ────────────────────────────────────────────────────────────

/// A storage string that cannot be turned back into a [`crate::State`].
#[derive(Debug, Error)]
pub enum StateError {
    #[error("malformed state: not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("malformed state: expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("malformed state: missing field `{0}`")]
    MissingField(&'static str),

    #[error("malformed state: {0}")]
    InvalidField(#[source] serde_json::Error),
}

// ─── Store errors ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Get,
    Set,
    Remove,
    ListKeys,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Remove => "remove",
            Self::ListKeys => "list_keys",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{operation} failed for key '{key}': {message}")]
    Operation {
        operation: StoreOperation,
        key: String,
        message: String,
    },

    #[error("backend {backend} unavailable: {message}")]
    Unavailable { backend: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn operation(
        operation: StoreOperation,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Operation {
            operation,
            key: key.into(),
            message: message.into(),
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, AuthStateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_correctly() {
        let err = AuthStateError::Config(ConfigError::Validation("sweep_concurrency".into()));
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn store_operation_error_names_key_and_operation() {
        let err = StoreError::operation(StoreOperation::Remove, "oidc.abc", "disk full");
        let rendered = err.to_string();
        assert!(rendered.contains("remove"));
        assert!(rendered.contains("oidc.abc"));
        assert!(rendered.contains("disk full"));
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let err: AuthStateError = anyhow_err.into();
        assert!(err.to_string().contains("something went wrong"));
    }

    #[test]
    fn backend_failures_pass_through_store_error() {
        let store_err: StoreError = anyhow::anyhow!("redis: connection reset").into();
        assert!(matches!(store_err, StoreError::Other(_)));

        let err: AuthStateError = store_err.into();
        assert!(matches!(err, AuthStateError::Store(StoreError::Other(_))));
        assert_eq!(err.to_string(), "store: redis: connection reset");
    }

    #[test]
    fn state_error_lifts_into_top_level() {
        let err: AuthStateError = StateError::NotAnObject("array").into();
        assert!(err.to_string().contains("expected a JSON object"));
    }
}
