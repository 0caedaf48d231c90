use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a verification before a verdict is reached.
///
/// None of these are retried; each one becomes a single ERROR result.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Binary not found: {}", .0.display())]
    BinaryNotFound(PathBuf),
    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("{tool} command not found")]
    ToolUnavailable { tool: String },
    #[error("{tool} failed: {message}")]
    ToolError { tool: String, message: String },
    #[error("{tool} timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

impl InspectError {
    /// True for problems with the input path, raised before any tool runs.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::BinaryNotFound(_) | Self::NotAFile(_))
    }

    /// True when the inspection tool could not be run to completion.
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            Self::ToolUnavailable { .. } | Self::ToolError { .. } | Self::Timeout { .. }
        )
    }
}
