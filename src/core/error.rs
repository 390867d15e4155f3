use std::path::PathBuf;

use thiserror::Error;

/// Failures that decide the process exit status.
///
/// Commands wrap these in `anyhow::Error`; `main` downcasts to pick the code.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}:{col}: {message}")]
    Parse {
        path: String,
        line: usize,
        col: usize,
        message: String,
        /// The offending line, when the input is text.
        source_line: Option<String>,
    },

    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "key collision on {key}: '{first}' and '{second}' (use --idbased or add a disambiguation)"
    )]
    KeyCollision {
        key: String,
        first: String,
        second: String,
    },

    #[error("{0}")]
    Argument(String),
}

impl PipelineError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Parse error at byte `offset` of `content`, with line and column derived from it.
    pub fn parse_at(path: &str, content: &[u8], offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(content.len());
        let before = &content[..offset];
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let col = String::from_utf8_lossy(&content[line_start..offset])
            .chars()
            .count()
            + 1;
        let line_end = content[line_start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| line_start + i)
            .unwrap_or(content.len());
        let source_line = String::from_utf8_lossy(&content[line_start..line_end])
            .trim_end_matches('\r')
            .to_string();

        Self::Parse {
            path: path.to_string(),
            line,
            col,
            message: message.into(),
            source_line: Some(source_line),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
