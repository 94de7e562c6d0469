//! Loading collections from external sources.
//!
//! A [`Source`] knows how to read a dataset from a directory on disk and,
//! optionally, how to download it there first. [`load`] drives the two
//! steps: depending on [`DownloadMode`] it either reads what is already
//! present, fetches unconditionally, or fetches only when the local copy is
//! missing.

use std::fs;
use std::path::{Path, PathBuf};

use bon::Builder;

use crate::collection::Collection;
use crate::error::DatasetError;
use crate::item::DataItem;
use crate::task::TaskDescriptor;

/// When to invoke [`Source::download`] during [`load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMode {
    /// Read the local copy; download only when it is missing.
    #[default]
    Auto,
    /// Always download before reading.
    Always,
    /// Never download; a missing local copy is an error.
    Never,
}

/// A dataset readable from (and optionally downloadable to) a directory.
pub trait Source {
    /// Data payload of the produced items.
    type Data: Clone + Send + Sync + 'static;

    /// Name of the produced collection, used to synthesize item ids.
    fn name(&self) -> &str;

    /// Read items from `root`.
    ///
    /// # Errors
    ///
    /// [`DatasetError::NotFound`] when the expected files are absent; any
    /// other error when they are present but unreadable.
    fn prepare(&self, root: &Path) -> Result<Vec<DataItem<Self::Data>>, DatasetError>;

    /// Fetch the dataset into `root`.
    ///
    /// The default implementation reports the source as not downloadable.
    ///
    /// # Errors
    ///
    /// [`DatasetError::DownloadUnsupported`] by default.
    fn download(&self, root: &Path) -> Result<(), DatasetError> {
        let _ = root;
        Err(DatasetError::DownloadUnsupported)
    }

    /// Task descriptors to attach to the loaded collection, when the source
    /// knows them up front. `None` leaves them to inference.
    fn tasks(&self) -> Option<Vec<TaskDescriptor>> {
        None
    }
}

/// Options for [`load`].
#[derive(Debug, Clone, Builder)]
pub struct LoadOptions {
    /// Directory the source reads from and downloads into.
    #[builder(into)]
    pub root: PathBuf,
    /// Download policy.
    #[builder(default)]
    pub mode: DownloadMode,
}

/// Load a collection from `source` under the given options.
///
/// Under [`DownloadMode::Auto`], a [`DatasetError::NotFound`] from the first
/// read triggers one download followed by a second read; any other read
/// error is returned as-is without attempting a download.
///
/// # Errors
///
/// Read errors from [`Source::prepare`]; download errors wrapped in
/// [`DatasetError::DownloadFailed`].
///
/// # Example
///
/// ```no_run
/// use datakit::{load, LoadOptions, DownloadMode};
/// # use datakit::{DataItem, DatasetError, Source};
/// # use std::path::Path;
/// # struct Digits;
/// # impl Source for Digits {
/// #     type Data = Vec<f32>;
/// #     fn name(&self) -> &str { "digits" }
/// #     fn prepare(&self, _: &Path) -> Result<Vec<DataItem<Vec<f32>>>, DatasetError> { Ok(vec![]) }
/// # }
///
/// let options = LoadOptions::builder()
///     .root("data/digits")
///     .mode(DownloadMode::Auto)
///     .build();
/// let dataset = load(&Digits, &options)?;
/// # Ok::<(), DatasetError>(())
/// ```
pub fn load<S: Source>(
    source: &S,
    options: &LoadOptions,
) -> Result<Collection<S::Data>, DatasetError> {
    let root = options.root.as_path();
    let items = match options.mode {
        DownloadMode::Never => source.prepare(root)?,
        DownloadMode::Always => download_then_prepare(source, root)?,
        DownloadMode::Auto => match source.prepare(root) {
            Ok(items) => items,
            Err(DatasetError::NotFound { .. }) => download_then_prepare(source, root)?,
            Err(error) => return Err(error),
        },
    };

    let mut builder = Collection::builder().name(source.name()).items(items);
    if let Some(tasks) = source.tasks() {
        builder = builder.tasks(tasks);
    }
    Ok(builder.build())
}

fn download_then_prepare<S: Source>(
    source: &S,
    root: &Path,
) -> Result<Vec<DataItem<S::Data>>, DatasetError> {
    fs::create_dir_all(root)?;
    source
        .download(root)
        .map_err(|error| DatasetError::DownloadFailed {
            root: root.to_path_buf(),
            source: Box::new(error),
        })?;
    source.prepare(root)
}
