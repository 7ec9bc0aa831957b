//! Error types for boot script handling

use thiserror::Error;

/// Error type for boot script validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    /// Script does not start with the interpreter header
    #[error("missing script header: expected {0}")]
    MissingHeader(&'static str),

    /// Line starts with something that is not a command
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    /// Command that needs an argument has none
    #[error("line {line}: '{command}' requires an argument")]
    MissingArgument { line: usize, command: String },

    /// Double quote opened but never closed on a line
    #[error("line {0}: unterminated quote")]
    UnterminatedQuote(usize),

    /// Closing brace without a block, or block never closed
    #[error("unbalanced braces at line {0}")]
    UnbalancedBraces(usize),

    /// GRUB config without a menu entry
    #[error("no menuentry defined")]
    NoMenuEntry,

    /// Boot document without a kernel
    #[error("missing kernel")]
    MissingKernel,
}

/// Result type for boot script operations
pub type Result<T> = std::result::Result<T, ScriptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScriptError::UnknownCommand {
            line: 3,
            command: "kernal".to_string(),
        };
        assert_eq!(err.to_string(), "line 3: unknown command 'kernal'");

        let err = ScriptError::MissingHeader("#!ipxe");
        assert_eq!(err.to_string(), "missing script header: expected #!ipxe");
    }
}
