use std::fmt;

/// A location in the character input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Number of characters consumed before the error, 0-based.
    pub offset: usize,
    /// Line number, 1-based.
    pub line: usize,
    /// Column within the line, 1-based.
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at {} [character {} line {}]",
            self.offset, self.column, self.line
        )
    }
}

/// Errors raised while tokenizing, parsing or navigating XML.
#[derive(Debug)]
pub enum Error {
    /// Malformed markup. Always fatal to the current parse.
    Syntax { message: String, position: Position },
    /// A path segment was never reached.
    NotFound { path: String, segment: String },
    /// The operation needs a capability the input source lacks.
    UnsupportedOperation(String),
    /// Reading from the underlying source failed.
    Io(std::io::Error),
}

impl Error {
    pub(crate) fn syntax(message: impl Into<String>, position: Position) -> Self {
        Error::Syntax {
            message: message.into(),
            position,
        }
    }

    /// The position of a syntax error, if this is one.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Syntax { position, .. } => Some(*position),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Syntax { message, position } => write!(f, "{} {}", message, position),
            Error::NotFound { path, segment } => {
                write!(f, "path {} not found: no element '{}'", path, segment)
            }
            Error::UnsupportedOperation(message) => write!(f, "unsupported: {}", message),
            Error::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    #[inline]
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
