use crate::hooks::HookPoint;

pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by hook callbacks. Hooks are trusted code; whatever they return aborts the
/// current call.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("TRUSTED_TYPES_POLICY configuration option must provide a \"createHTML\" hook")]
    MissingCreateHtml,

    #[error("TRUSTED_TYPES_POLICY configuration option must provide a \"createScriptURL\" hook")]
    MissingCreateScriptUrl,

    #[error("invalid {option} pattern: {source}")]
    InvalidPattern {
        option: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("dirty is not a string, aborting (got {kind})")]
    NotAString { kind: &'static str },

    #[error("root node <{tag}> is forbidden and cannot be sanitized in-place")]
    ForbiddenInPlaceRoot { tag: String },

    #[error("hook {point} expects a {expected} callback")]
    HookKindMismatch {
        point: HookPoint,
        expected: &'static str,
    },

    #[error("the thread's default sanitizer is already running a call")]
    DefaultBusy,

    #[error("{point} hook failed: {source}")]
    Hook {
        point: HookPoint,
        #[source]
        source: HookError,
    },
}
