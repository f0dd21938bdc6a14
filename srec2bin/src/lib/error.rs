use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::io;

/// Broad classification of a decoding failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An unexpected character where `S`, a type digit, or a hex digit
    /// was required.
    MalformedLine,
    /// A record type digit with no defined address width (S4, S6).
    UnsupportedRecordType,
    /// An input file could not be opened.
    FileOpenFailure,
    /// Reading an input failed part way through.
    Io,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::MalformedLine => "malformed line",
            ErrorKind::UnsupportedRecordType => "unsupported record type",
            ErrorKind::FileOpenFailure => "failed to open file",
            ErrorKind::Io => "read error",
        };
        f.write_str(name)
    }
}

/// Error representation. `line` and `column` are 1-based and point at the
/// offending character; both are zero when there is no position.
#[derive(Debug)]
pub struct SrecError {
    pub kind: ErrorKind,
    pub line: usize,
    pub column: usize,
    pub message: Cow<'static, str>,
}

impl SrecError {
    /// Convenient creation without position context.
    pub(crate) fn new<S>(kind: ErrorKind, message: S) -> Self
        where S: Into<Cow<'static, str>>
    {
        SrecError {
            kind,
            line: 0,
            column: 0,
            message: message.into(),
        }
    }

    /// Attach a position, unless one has already been attached.
    pub(crate) fn at(mut self, line: usize, column: usize) -> Self {
        if self.line == 0 {
            self.line = line;
            self.column = column;
        }
        self
    }
}

impl Display for SrecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "{}: {}", self.kind, self.message)
        } else {
            write!(f, "{} at line {}, column {}: {}",
                   self.kind, self.line, self.column, self.message)
        }
    }
}

impl std::error::Error for SrecError {}

/// Result type alias.
pub type SrecResult<T> = Result<T, SrecError>;

/// Convert IO errors to read errors.
impl From<io::Error> for SrecError {
    fn from(e: io::Error) -> Self {
        SrecError::new(ErrorKind::Io, e.to_string())
    }
}

/// Return a malformed-line error built from a format string.
macro_rules! malformed {
    ($($arg:tt)+) => {
        $crate::error::SrecError::new(
            $crate::error::ErrorKind::MalformedLine, format!($($arg)+))
    }
}
