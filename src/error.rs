//! Error taxonomy for collection construction and access.
//!
//! Construction-time errors ([`NotFound`](DatasetError::NotFound),
//! [`DownloadFailed`](DatasetError::DownloadFailed),
//! [`TaskConflict`](DatasetError::TaskConflict)) abort object creation
//! entirely; no partially-constructed container is ever exposed. Per-call
//! errors ([`IndexOutOfBounds`](DatasetError::IndexOutOfBounds),
//! [`UnsupportedMap`](DatasetError::UnsupportedMap),
//! [`MapContract`](DatasetError::MapContract)) are returned to the caller
//! and leave container state untouched.

use std::path::PathBuf;

/// Errors produced while constructing or accessing collections.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// No data at the given root.
    ///
    /// Recoverable during [`load`](crate::load) when the source has a
    /// download hook; otherwise fatal.
    #[error("no data found at '{}'", root.display())]
    NotFound {
        /// The root that was searched.
        root: PathBuf,
    },

    /// The source's download hook failed.
    #[error("failed to download data to '{}'", root.display())]
    DownloadFailed {
        /// The root that was being populated.
        root: PathBuf,
        /// The error the hook reported.
        #[source]
        source: Box<DatasetError>,
    },

    /// The source does not implement a download hook.
    #[error("this source does not support downloading")]
    DownloadUnsupported,

    /// Filesystem error while preparing a data root.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A batched map function returned a wrong-length batch.
    #[error("batched map function returned {got} values for a batch of {expected}")]
    MapContract {
        /// Input batch length.
        expected: usize,
        /// Output batch length.
        got: usize,
    },

    /// `map` was called on a container that does not own its items.
    #[error("cannot map over a {kind}; only an owning collection can be mapped")]
    UnsupportedMap {
        /// The offending container kind (`"view"` or `"concatenation"`).
        kind: &'static str,
    },

    /// Index past the end of a container.
    #[error("index {index} out of bounds for collection of length {len}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The container length.
        len: usize,
    },

    /// Two concatenated containers disagree about a task they share.
    #[error("task '{name}' has conflicting {field}s: {left} vs {right}")]
    TaskConflict {
        /// Name of the conflicting task.
        name: String,
        /// Which part disagrees (`"kind"` or `"shape"`).
        field: &'static str,
        /// The left-hand side's value.
        left: String,
        /// The right-hand side's value.
        right: String,
    },
}
