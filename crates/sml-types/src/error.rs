use thiserror::Error;

/// Everything that can stop a compile before machine code runs.
///
/// `Syntax` and `Link` carry the 1-based source line they were raised
/// against, mirroring the line-numbered diagnostics a hand-written
/// assembler gives; `Resource` covers failures that aren't about any one
/// line (an empty file, a source over the configured line cap, a failed
/// memory allocation).
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("line {line}: {message}")]
    Syntax { line: u32, message: String },

    #[error("line {line}: {message}")]
    Link { line: u32, message: String },

    #[error("{message}")]
    Resource { message: String },
}

impl CompileError {
    pub fn syntax(line: u32, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    pub fn link(line: u32, message: impl Into<String>) -> Self {
        Self::Link {
            line,
            message: message.into(),
        }
    }

    pub fn resource(message: impl Into<String>) -> Self {
        Self::Resource {
            message: message.into(),
        }
    }
}
