use core::fmt;

/// The error type returned by fallible operations in this crate.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    msg: Option<&'static str>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, msg: Option<&'static str>) -> Self {
        Self { kind, msg }
    }

    /// Get the [`ErrorKind`] describing the category of failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(msg) = self.msg {
            write!(f, "{}: {}", self.kind, msg)
        } else {
            self.kind.fmt(f)
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// The category of failure reported by an [`Error`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ErrorKind {
    /// An argument was outside the set of values the operation accepts (a
    /// non-null zone for a family without zones, `bitsPerDigit` too wide for
    /// the regrouper, ...).
    InvalidArgument,
    /// A position or range fell outside the bounds of a grouping or section.
    IndexOutOfBounds,
    /// A `replace` would write past the end of the target section.
    AddressSizeMismatch,
    /// A range-valued division sequence could not be expressed as a single
    /// `lower-upper` pair.
    MismatchedSegmentRanges,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::IndexOutOfBounds => write!(f, "index out of bounds"),
            Self::AddressSizeMismatch => write!(f, "address size mismatch"),
            Self::MismatchedSegmentRanges => write!(f, "mismatched segment ranges"),
        }
    }
}

macro_rules! err {
    ( $kind:expr ) => {
        $crate::error::Error::new($kind, None)
    };
    ( $kind:expr, $msg:expr ) => {
        $crate::error::Error::new($kind, Some($msg))
    };
}
pub(crate) use err;
