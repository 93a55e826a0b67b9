use std::fmt::{Display, Formatter};

use crate::bptree;

/// A `Result` type returned by [`BPTree::verify`](crate::BPTree::verify).
pub type Result<T> = std::result::Result<T, Error>;

/// The kinds of broken invariants a tree check can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A page holds too few or too many items.
    Occupancy,
    /// Keys are out of order, or a separator doesn't match its child.
    Order,
    /// The leaf chain, the depth of the leaves or the page ownership is inconsistent.
    Linkage,
    /// The entry count doesn't match the entries held.
    Accounting,
}

#[derive(Debug)]
pub struct Error {
    code: ErrorCode,
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl Display for ErrorCode {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Occupancy => "page occupancy out of bounds",
            Self::Order => "key order violated",
            Self::Linkage => "tree linkage broken",
            Self::Accounting => "entry count mismatch",
        })
    }
}

impl Error {
    #[inline]
    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.source)
    }
}

impl std::error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<bptree::Occupancy> for Error {
    #[inline]
    fn from(value: bptree::Occupancy) -> Self {
        Self {
            code: ErrorCode::Occupancy,
            source: Box::new(value),
        }
    }
}

impl From<bptree::Order> for Error {
    #[inline]
    fn from(value: bptree::Order) -> Self {
        Self {
            code: ErrorCode::Order,
            source: Box::new(value),
        }
    }
}

impl From<bptree::Linkage> for Error {
    #[inline]
    fn from(value: bptree::Linkage) -> Self {
        Self {
            code: ErrorCode::Linkage,
            source: Box::new(value),
        }
    }
}

impl From<bptree::Accounting> for Error {
    #[inline]
    fn from(value: bptree::Accounting) -> Self {
        Self {
            code: ErrorCode::Accounting,
            source: Box::new(value),
        }
    }
}
