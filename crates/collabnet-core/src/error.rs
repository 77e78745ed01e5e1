use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for scripted pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InputMissing,
    InputUnreadable,
    ConfigParseError,
    EmptyJoin,
    EmptyGraph,
    PartialWriteFailed,
    ConsolidationFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InputMissing => "E1001",
            Self::InputUnreadable => "E1002",
            Self::ConfigParseError => "E1003",
            Self::EmptyJoin => "E2001",
            Self::EmptyGraph => "E2002",
            Self::PartialWriteFailed => "E5001",
            Self::ConsolidationFailed => "E5002",
            Self::LockContention => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InputMissing => "Input table not found",
            Self::InputUnreadable => "Input table could not be parsed",
            Self::ConfigParseError => "Config file parse error",
            Self::EmptyJoin => "Joined input table is empty",
            Self::EmptyGraph => "Collaboration graph is empty",
            Self::PartialWriteFailed => "Partial batch write failed",
            Self::ConsolidationFailed => "Final table consolidation failed",
            Self::LockContention => "Output directory is locked",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InputMissing => Some("Check the --countries and --metrics paths."),
            Self::InputUnreadable => {
                Some("Both tables must be CSV with a header row containing `login`.")
            }
            Self::ConfigParseError => Some("Fix syntax in collabnet.toml and retry."),
            Self::EmptyJoin => Some("No login appears in both tables; verify the collection run."),
            Self::EmptyGraph => {
                Some("No repository has two or more contributors; nothing to analyze.")
            }
            Self::PartialWriteFailed => {
                Some("Check disk space and permissions, then rerun to resume from the checkpoint.")
            }
            Self::ConsolidationFailed => {
                Some("Partial files are kept; rerun to retry consolidation.")
            }
            Self::LockContention => {
                Some("Another collabnet run is writing to this directory; wait or pick --out.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Fatal conditions that abort an analysis run before any result is written.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("{}: input table not found: {}", ErrorCode::InputMissing, .0.display())]
    InputMissing(PathBuf),

    #[error("{}: failed to read {}: {reason}", ErrorCode::InputUnreadable, .path.display())]
    InputUnreadable { path: PathBuf, reason: String },

    #[error("{}: join of countries and metrics tables produced no rows", ErrorCode::EmptyJoin)]
    EmptyJoin,

    #[error("{}: collaboration graph has no nodes", ErrorCode::EmptyGraph)]
    EmptyGraph,
}

impl AnalysisError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InputMissing(_) => ErrorCode::InputMissing,
            Self::InputUnreadable { .. } => ErrorCode::InputUnreadable,
            Self::EmptyJoin => ErrorCode::EmptyJoin,
            Self::EmptyGraph => ErrorCode::EmptyGraph,
        }
    }
}
