use std::fmt;

/// Errors produced when parsing a definition file. Always carries the
/// 1-based line number of the offending line.
#[derive(Debug)]
pub struct ParseError {
    line: usize,
    message: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_line() {
        let err = ParseError::new(12, "unexpected token");
        assert_eq!(err.to_string(), "line 12: unexpected token");
        assert_eq!(err.line(), 12);
    }
}
