use core::fmt;

/// Result alias for `arbor`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by clustering and hierarchy primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// Invalid number of clusters requested.
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// The similarity function returned nothing (or NaN) for a pair.
    MissingSimilarity {
        /// Debug rendering of the first id.
        first: String,
        /// Debug rendering of the second id.
        second: String,
    },

    /// No linkage is registered under this name.
    UnknownLinkage(String),

    /// The run was cancelled at a checkpoint.
    Aborted,

    /// Generic error with message.
    Other(String),
}

impl Error {
    /// True if this error is a cooperative cancellation rather than a failure.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Aborted)
    }

    pub(crate) fn missing_similarity<I: fmt::Debug>(a: &I, b: &I) -> Self {
        Error::MissingSimilarity {
            first: format!("{a:?}"),
            second: format!("{b:?}"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::InvalidClusterCount { requested, n_items } => {
                write!(f, "cannot create {requested} clusters from {n_items} items")
            }
            Error::MissingSimilarity { first, second } => {
                write!(f, "similarity undefined between {first} and {second}")
            }
            Error::UnknownLinkage(name) => write!(f, "unknown linkage '{name}'"),
            Error::Aborted => write!(f, "clustering aborted"),
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}
