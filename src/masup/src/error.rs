use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = MasupError> = std::result::Result<T, E>;

/// Errors surfaced by the tracking engine.
///
/// Per-process failures (a process exiting mid-enumeration, denied access to its
/// executable or command line) never show up here: they are absorbed by the
/// snapshot provider.
#[derive(Debug, Error)]
pub enum MasupError {
    /// The host process enumeration itself failed; the tick was aborted before any state changed.
    #[error("failed to enumerate host processes: {0}")]
    Enumeration(String),

    /// A catalog entry carries a detection pattern that does not compile.
    #[error("invalid detection pattern for tool '{tool_id}': {source}")]
    InvalidPattern {
        tool_id: String,
        #[source]
        source: regex::Error,
    },

    /// A catalog or workflow document is structurally malformed.
    #[error("malformed {kind} definition: {message}")]
    Definition { kind: &'static str, message: String },

    #[error("failed to export analysis to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize analysis snapshot: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported analysis snapshot version {found} (expected {expected})")]
    UnsupportedSnapshotVersion { found: u32, expected: u32 },
}

impl MasupError {
    pub(crate) fn catalog(message: impl std::fmt::Display) -> Self {
        MasupError::Definition {
            kind: "tool catalog",
            message: message.to_string(),
        }
    }

    pub(crate) fn workflow(message: impl std::fmt::Display) -> Self {
        MasupError::Definition {
            kind: "workflow",
            message: message.to_string(),
        }
    }
}
