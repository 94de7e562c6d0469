//! datakit: composable in-memory datasets for Rust.
//!
//! Ordered containers of labeled examples with cheap, non-copying
//! composition: slices, index views, random splits, and concatenations all
//! reference their parent container instead of duplicating it, and lazy
//! per-field transform chains rewrite samples at access time.
//!
//! # Key Types
//!
//! - [`Collection`] - The container handle: owning collections, views, and
//!   concatenations behind one uniform indexable interface
//! - [`DataItem`] / [`Sample`] - Stored examples and resolved access results
//! - [`Target`] / [`TaskDescriptor`] - Supervision values and the tasks
//!   inferred from them
//! - [`Source`] / [`load`] - Reading (and downloading) datasets from disk
//!
//! # Example
//!
//! ```
//! use datakit::{Collection, DataItem, TaskKind};
//!
//! let dataset = Collection::builder()
//!     .name("reviews")
//!     .item(DataItem::new("great").with_target(true))
//!     .item(DataItem::new("awful").with_target(false))
//!     .item(DataItem::new("fine").with_target(true))
//!     .build();
//!
//! // A deterministic 1/3 holdout; both sides are views, nothing is copied.
//! let (train, test) = dataset.split(1.0 / 3.0, Some(42));
//! assert_eq!(train.len() + test.len(), dataset.len());
//!
//! // Transforms are lazy and scoped to the container they were added to.
//! let shouty = train.transform_data(|text| {
//!     if text.len() > 4 { "long" } else { "short" }
//! });
//!
//! assert_eq!(dataset.tasks()[0].kind, TaskKind::Binary);
//! # assert!(shouty.len() <= 3);
//! ```

pub mod collate;
pub mod collection;
pub mod error;
pub mod item;
pub mod source;
pub mod task;

mod transform;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use collate::{collate_with, split_ids};
pub use collection::{Collection, CollectionBuilder, IndexOrder, Samples};
pub use error::DatasetError;
pub use item::{DataItem, Sample, Target};
pub use source::{load, DownloadMode, LoadOptions, Source};
pub use task::{TaskDescriptor, TaskKind, TaskShape};
