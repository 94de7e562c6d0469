//! Source loading: download policies and error propagation.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use datakit::{load, DataItem, DatasetError, DownloadMode, LoadOptions, Source, TaskDescriptor, TaskKind, TaskShape};
use tempfile::TempDir;

/// Reads one line-per-example file, counting calls to each step.
struct LinesSource {
    prepares: AtomicUsize,
    downloads: AtomicUsize,
}

impl LinesSource {
    fn new() -> Self {
        Self {
            prepares: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
        }
    }
}

impl Source for LinesSource {
    type Data = String;

    fn name(&self) -> &str {
        "lines"
    }

    fn prepare(&self, root: &Path) -> Result<Vec<DataItem<String>>, DatasetError> {
        self.prepares.fetch_add(1, Ordering::SeqCst);
        let path = root.join("data.txt");
        if !path.exists() {
            return Err(DatasetError::NotFound {
                root: root.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path)?;
        Ok(contents
            .lines()
            .map(|line| DataItem::new(line.to_string()))
            .collect())
    }

    fn download(&self, root: &Path) -> Result<(), DatasetError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        fs::write(root.join("data.txt"), "alpha\nbeta\n")?;
        Ok(())
    }
}

/// A source whose local copy is never present and cannot be fetched.
struct Unfetchable;

impl Source for Unfetchable {
    type Data = ();

    fn name(&self) -> &str {
        "unfetchable"
    }

    fn prepare(&self, root: &Path) -> Result<Vec<DataItem<()>>, DatasetError> {
        Err(DatasetError::NotFound {
            root: root.to_path_buf(),
        })
    }
}

fn options(root: &Path, mode: DownloadMode) -> LoadOptions {
    LoadOptions::builder().root(root).mode(mode).build()
}

#[test]
fn auto_downloads_once_when_missing() {
    let dir = TempDir::new().unwrap();
    let source = LinesSource::new();

    let dataset = load(&source, &options(dir.path(), DownloadMode::Auto)).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.resolve(0).unwrap().data, "alpha");
    assert_eq!(dataset.resolve(0).unwrap().id, "lines-0");

    // Failed read, download, successful read.
    assert_eq!(source.prepares.load(Ordering::SeqCst), 2);
    assert_eq!(source.downloads.load(Ordering::SeqCst), 1);
}

#[test]
fn auto_skips_the_download_when_present() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("data.txt"), "only\n").unwrap();
    let source = LinesSource::new();

    let dataset = load(&source, &options(dir.path(), DownloadMode::Auto)).unwrap();
    assert_eq!(dataset.len(), 1);
    assert_eq!(source.prepares.load(Ordering::SeqCst), 1);
    assert_eq!(source.downloads.load(Ordering::SeqCst), 0);
}

#[test]
fn always_downloads_even_when_present() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("data.txt"), "stale\n").unwrap();
    let source = LinesSource::new();

    let dataset = load(&source, &options(dir.path(), DownloadMode::Always)).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(source.downloads.load(Ordering::SeqCst), 1);
}

#[test]
fn never_fails_fast_when_missing() {
    let dir = TempDir::new().unwrap();
    let source = LinesSource::new();

    let err = load(&source, &options(dir.path(), DownloadMode::Never)).unwrap_err();
    assert!(matches!(err, DatasetError::NotFound { .. }));
    assert_eq!(source.downloads.load(Ordering::SeqCst), 0);
}

#[test]
fn sources_without_download_report_it() {
    let dir = TempDir::new().unwrap();

    let err = load(&Unfetchable, &options(dir.path(), DownloadMode::Auto)).unwrap_err();
    match err {
        DatasetError::DownloadFailed { source, .. } => {
            assert!(matches!(*source, DatasetError::DownloadUnsupported));
        }
        other => panic!("expected DownloadFailed, got {other:?}"),
    }
}

#[test]
fn declared_source_tasks_reach_the_collection() {
    struct Labeled;
    impl Source for Labeled {
        type Data = i64;

        fn name(&self) -> &str {
            "labeled"
        }

        fn prepare(&self, _root: &Path) -> Result<Vec<DataItem<i64>>, DatasetError> {
            Ok(vec![DataItem::new(1).with_target(true)])
        }

        fn tasks(&self) -> Option<Vec<TaskDescriptor>> {
            Some(vec![TaskDescriptor::new(
                "sentiment",
                TaskKind::Binary,
                TaskShape::Classes(2),
            )])
        }
    }

    let dir = TempDir::new().unwrap();
    let dataset = load(&Labeled, &options(dir.path(), DownloadMode::Never)).unwrap();
    assert_eq!(dataset.tasks()[0].name, "sentiment");
}
