//! Error types for obslist.

use alloc::string::String;
use core::fmt;

/// Result type alias for obslist operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while classifying mutation batches.
///
/// Every variant is terminal for the stream that observes it: there is no
/// retry, the ledger or the host has already diverged from the collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A removal was reported for a key the occurrence ledger does not hold.
    LedgerDesync,
    /// An update range does not fit inside the batch snapshot.
    RangeOutOfBounds {
        from: usize,
        to: usize,
        len: usize,
    },
    /// The host failed while delivering a notification.
    Upstream {
        message: String,
    },
    /// The host collection is gone.
    Detached,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LedgerDesync => {
                write!(f, "Invalid state: removal of a key with no live occurrence")
            }
            Error::RangeOutOfBounds { from, to, len } => {
                write!(
                    f,
                    "Update range {}..{} out of bounds for snapshot of length {}",
                    from, to, len
                )
            }
            Error::Upstream { message } => {
                write!(f, "Upstream error: {}", message)
            }
            Error::Detached => {
                write!(f, "Source collection has been dropped")
            }
        }
    }
}

impl Error {
    /// Creates an upstream delivery error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Error::Upstream {
            message: message.into(),
        }
    }

    /// Creates a range error for an update that overruns the snapshot.
    pub fn range_out_of_bounds(from: usize, to: usize, len: usize) -> Self {
        Error::RangeOutOfBounds { from, to, len }
    }

    /// Returns true for a ledger desynchronization.
    #[inline]
    pub fn is_desync(&self) -> bool {
        matches!(self, Error::LedgerDesync)
    }
}
