//! Error types for reading and writing interchange documents

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum InterchangeError {
    #[error("invalid document at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(String),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for InterchangeError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return InterchangeError::Io(err.into());
        }
        let (line, column) = (err.line(), err.column());
        let full = err.to_string();
        let suffix = format!(" at line {} column {}", line, column);
        let message = full.strip_suffix(&suffix).unwrap_or(&full).to_string();
        InterchangeError::Syntax {
            line,
            column,
            message,
        }
    }
}

impl InterchangeError {
    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let InterchangeError::Syntax {
            line,
            column,
            message,
        } = self
        else {
            return self.to_string();
        };

        let span = span_at(source, *line, *column);
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message("invalid interchange document")
            .with_label(
                Label::new((filename, span))
                    .with_message(message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// One-character span at a 1-based line and column, clamped to the source
fn span_at(source: &str, line: usize, column: usize) -> Span {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let start = (line_start + column.saturating_sub(1)).min(source.len());
    start..(start + 1).min(source.len())
}
