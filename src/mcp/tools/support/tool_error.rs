use rmcp::{ErrorData as McpError, model::ErrorCode};
use std::fmt::Display;

/// Maps a failed Azure DevOps call (authentication included) to a failed tool call.
pub fn tool_error(error: impl Display) -> McpError {
    McpError {
        code: ErrorCode(-32000),
        message: error.to_string().into(),
        data: None,
    }
}
