//! Dataset containers: owning collections, index views, and concatenations.
//!
//! This module provides [`Collection`], a shared handle over one of three
//! container kinds:
//!
//! - an **owning collection** holding the actual items, the only container
//!   that supports in-place [`map_data`](Collection::map_data) /
//!   [`map_targets`](Collection::map_targets);
//! - an **index view**, a non-copying subset of a parent container;
//! - a **concatenation**, a non-copying join of two parent containers.
//!
//! Views hold handle clones of their parents, never snapshots, so mapping an
//! owning collection is observed by every view built on top of it. Every
//! container carries its own lazy transform chains, applied parent-first as
//! [`resolve`](Collection::resolve) walks back down the view stack.
//!
//! # Concurrency
//!
//! The handle is `Send + Sync`. Reads (`resolve`, `len`, `tasks`) take a read
//! lock; `map_*` and transform registration take the write lock. Index lists
//! and concatenation transition points are fixed at construction; only the
//! transform chains grow.

use std::collections::HashSet;
use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::DatasetError;
use crate::item::{DataItem, Sample, Target};
use crate::task::{infer_tasks, merge_tasks, TaskDescriptor};
use crate::transform::TransformChain;

/// Default collection name, used to synthesize ids for items without one.
const DEFAULT_NAME: &str = "collection";

/// Deduplication order for view indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexOrder {
    /// Sort the deduplicated indices ascending.
    #[default]
    Sorted,
    /// Keep the first occurrence of each index, in input order.
    Preserve,
}

// ============================================================================
// Internal representation
// ============================================================================

enum Node<D> {
    Owned {
        name: String,
        items: Vec<DataItem<D>>,
        /// Supplied at construction, or cached after the first inference.
        tasks: Option<Vec<TaskDescriptor>>,
    },
    View {
        parent: Collection<D>,
        /// Unique, in-range indices into the parent.
        indices: Vec<usize>,
    },
    Concat {
        left: Collection<D>,
        right: Collection<D>,
        /// `left.len()` at construction; indices below it route left.
        transition: usize,
        /// Total length, fixed at construction.
        len: usize,
        tasks: Vec<TaskDescriptor>,
    },
}

struct Inner<D> {
    node: Node<D>,
    data_transforms: TransformChain<D>,
    target_transforms: TransformChain<Target>,
}

impl<D> Inner<D> {
    fn kind(&self) -> &'static str {
        match self.node {
            Node::Owned { .. } => "collection",
            Node::View { .. } => "view",
            Node::Concat { .. } => "concatenation",
        }
    }

    fn len(&self) -> usize {
        match &self.node {
            Node::Owned { items, .. } => items.len(),
            Node::View { indices, .. } => indices.len(),
            Node::Concat { len, .. } => *len,
        }
    }

    fn owned_items_mut(&mut self) -> Result<&mut Vec<DataItem<D>>, DatasetError> {
        let kind = self.kind();
        match &mut self.node {
            Node::Owned { items, .. } => Ok(items),
            _ => Err(DatasetError::UnsupportedMap { kind }),
        }
    }
}

// ============================================================================
// Collection
// ============================================================================

/// A container of labeled examples.
///
/// `Collection` is a cheap-to-clone handle; clones share the same underlying
/// container. An owning collection exclusively owns its items, while views
/// and concatenations reference their parents through handles, keeping them
/// alive for as long as any view exists.
///
/// # Example
///
/// ```
/// use datakit::{Collection, DataItem};
///
/// let dataset = Collection::from_items(
///     (0..4).map(|i| DataItem::new(i * 10)).collect(),
/// );
///
/// let sample = dataset.resolve(2).unwrap();
/// assert_eq!(sample.data, 20);
/// assert_eq!(sample.id, "collection-2");
/// ```
pub struct Collection<D> {
    inner: Arc<RwLock<Inner<D>>>,
}

impl<D> Clone for Collection<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D> fmt::Debug for Collection<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read().expect("collection lock poisoned");
        f.debug_struct("Collection")
            .field("kind", &inner.kind())
            .field("len", &inner.len())
            .finish_non_exhaustive()
    }
}

impl<D: Clone + Send + Sync + 'static> Collection<D> {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create an owning collection from items, with the default name.
    pub fn from_items(items: Vec<DataItem<D>>) -> Self {
        Self::builder().items(items).build()
    }

    /// Create a builder for an in-memory owning collection.
    pub fn builder() -> CollectionBuilder<D> {
        CollectionBuilder::new()
    }

    fn from_node(node: Node<D>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                node,
                data_transforms: TransformChain::new(),
                target_transforms: TransformChain::new(),
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<D>> {
        self.inner.read().expect("collection lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<D>> {
        self.inner.write().expect("collection lock poisoned")
    }

    /// Build a view over unique, in-range indices.
    fn view_of(&self, indices: Vec<usize>) -> Self {
        Self::from_node(Node::View {
            parent: self.clone(),
            indices,
        })
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    /// Number of examples reachable through this container.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when the container holds no examples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve the example at `index` into a [`Sample`].
    ///
    /// Resolution recurses through view and concatenation layers until it
    /// reaches the owning collection, then applies each layer's transform
    /// chains on the way back out (parent chains first). An owned item
    /// without an id gets `"{name}-{index}"` synthesized from the owning
    /// collection's name and the position there.
    ///
    /// # Errors
    ///
    /// [`DatasetError::IndexOutOfBounds`] when `index >= len()`.
    pub fn resolve(&self, index: usize) -> Result<Sample<D>, DatasetError> {
        let inner = self.read();
        let mut sample = match &inner.node {
            Node::Owned { name, items, .. } => {
                let item = items.get(index).ok_or(DatasetError::IndexOutOfBounds {
                    index,
                    len: items.len(),
                })?;
                Sample {
                    id: item
                        .id
                        .clone()
                        .unwrap_or_else(|| format!("{name}-{index}")),
                    data: item.data.clone(),
                    target: item.target.clone(),
                }
            }
            Node::View { parent, indices } => {
                let parent_index = *indices.get(index).ok_or(DatasetError::IndexOutOfBounds {
                    index,
                    len: indices.len(),
                })?;
                parent.resolve(parent_index)?
            }
            Node::Concat {
                left,
                right,
                transition,
                len,
                ..
            } => {
                if index >= *len {
                    return Err(DatasetError::IndexOutOfBounds { index, len: *len });
                }
                if index < *transition {
                    left.resolve(index)?
                } else {
                    right.resolve(index - *transition)?
                }
            }
        };

        if !inner.data_transforms.is_empty() {
            sample.data = inner.data_transforms.apply(sample.data);
        }
        if !inner.target_transforms.is_empty() {
            sample.target = sample.target.map(|t| inner.target_transforms.apply(t));
        }
        Ok(sample)
    }

    /// Iterate over resolved samples in index order.
    pub fn iter(&self) -> Samples<'_, D> {
        Samples {
            collection: self,
            index: 0,
        }
    }

    /// The first `min(count, len)` resolved samples.
    pub fn examples(&self, count: usize) -> Vec<Sample<D>> {
        self.iter().take(count).collect()
    }

    /// Task descriptors for this container's targets.
    ///
    /// An owning collection returns the descriptors supplied at
    /// construction, or infers them from the stored targets once and caches
    /// the result. Views delegate to their parent; concatenations return the
    /// merged set computed when they were built.
    pub fn tasks(&self) -> Vec<TaskDescriptor> {
        let parent = {
            let inner = self.read();
            match &inner.node {
                Node::Owned {
                    tasks: Some(tasks), ..
                } => return tasks.clone(),
                Node::Concat { tasks, .. } => return tasks.clone(),
                Node::View { parent, .. } => parent.clone(),
                Node::Owned { tasks: None, .. } => {
                    drop(inner);
                    return self.infer_and_cache_tasks();
                }
            }
        };
        parent.tasks()
    }

    fn infer_and_cache_tasks(&self) -> Vec<TaskDescriptor> {
        let inferred = {
            let inner = self.read();
            match &inner.node {
                Node::Owned { items, .. } => {
                    infer_tasks(items.iter().filter_map(|item| item.target.as_ref()))
                }
                _ => unreachable!("container kind is fixed at construction"),
            }
        };
        let mut inner = self.write();
        match &mut inner.node {
            Node::Owned { tasks, .. } => tasks.get_or_insert(inferred).clone(),
            _ => unreachable!("container kind is fixed at construction"),
        }
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Build a view over the given parent indices.
    ///
    /// Indices are deduplicated, either sorted ascending or preserving first
    /// occurrence per `order`.
    ///
    /// # Errors
    ///
    /// [`DatasetError::IndexOutOfBounds`] when any index is out of range;
    /// no view is created.
    pub fn select(&self, indices: &[usize], order: IndexOrder) -> Result<Self, DatasetError> {
        let len = self.len();
        if let Some(&index) = indices.iter().find(|&&index| index >= len) {
            return Err(DatasetError::IndexOutOfBounds { index, len });
        }
        let unique = match order {
            IndexOrder::Sorted => {
                let mut unique = indices.to_vec();
                unique.sort_unstable();
                unique.dedup();
                unique
            }
            IndexOrder::Preserve => {
                let mut seen = HashSet::with_capacity(indices.len());
                indices
                    .iter()
                    .copied()
                    .filter(|&index| seen.insert(index))
                    .collect()
            }
        };
        Ok(self.view_of(unique))
    }

    /// Build a view over a contiguous index range.
    ///
    /// Bounds are clamped to the container length, so an oversized range
    /// yields a shorter (possibly empty) view rather than an error.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        let len = self.len();
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => len,
        };
        let start = start.min(len);
        let end = end.min(len).max(start);
        self.view_of((start..end).collect())
    }

    /// Randomly partition into `(rest, holdout)` views.
    ///
    /// The index range is shuffled with a Xoshiro256++ generator seeded from
    /// `seed` (or from entropy when absent), and
    /// `floor(len * fraction)` indices become the holdout. Both views
    /// preserve shuffle order. The same seed always produces the same
    /// partition.
    ///
    /// # Panics
    ///
    /// Panics if `fraction` is not in `[0, 1]`.
    pub fn split(&self, fraction: f64, seed: Option<u64>) -> (Self, Self) {
        assert!(
            (0.0..=1.0).contains(&fraction),
            "fraction must be in [0, 1], got {}",
            fraction
        );
        let len = self.len();
        let mut indices: Vec<usize> = (0..len).collect();
        let mut rng = match seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::seed_from_u64(rand::random()),
        };
        indices.shuffle(&mut rng);
        let n_holdout = (len as f64 * fraction) as usize;
        let holdout = self.view_of(indices[..n_holdout].to_vec());
        let rest = self.view_of(indices[n_holdout..].to_vec());
        (rest, holdout)
    }

    /// Build a view of the examples whose resolved sample satisfies
    /// `predicate`, preserving index order.
    ///
    /// # Errors
    ///
    /// Propagates any resolution error.
    pub fn filter<F>(&self, predicate: F) -> Result<Self, DatasetError>
    where
        F: Fn(&Sample<D>) -> bool,
    {
        let mut keep = Vec::new();
        for index in 0..self.len() {
            if predicate(&self.resolve(index)?) {
                keep.push(index);
            }
        }
        Ok(self.view_of(keep))
    }

    /// Concatenate with another container, producing a non-copying join.
    ///
    /// The transition point and total length are snapshotted here; the
    /// operand containers must not change length afterwards (nothing in
    /// this crate can change a container's length after construction).
    ///
    /// # Errors
    ///
    /// [`DatasetError::TaskConflict`] when the two sides share a task name
    /// but disagree on its kind or shape.
    pub fn concat(&self, other: &Self) -> Result<Self, DatasetError> {
        let tasks = merge_tasks(&self.tasks(), &other.tasks())?;
        let transition = self.len();
        let len = transition + other.len();
        Ok(Self::from_node(Node::Concat {
            left: self.clone(),
            right: other.clone(),
            transition,
            len,
            tasks,
        }))
    }

    // ------------------------------------------------------------------
    // Transforms (lazy)
    // ------------------------------------------------------------------

    /// Append a lazy transform to the data chain and return the handle.
    ///
    /// The function runs at every subsequent `resolve`, after any parent
    /// chains and after previously registered functions. Stored values are
    /// untouched.
    pub fn transform_data(self, function: impl Fn(D) -> D + Send + Sync + 'static) -> Self {
        self.write().data_transforms.push(function);
        self
    }

    /// Append a lazy transform to the target chain and return the handle.
    ///
    /// Applied only to samples that have a target.
    pub fn transform_targets(
        self,
        function: impl Fn(Target) -> Target + Send + Sync + 'static,
    ) -> Self {
        self.write().target_transforms.push(function);
        self
    }

    // ------------------------------------------------------------------
    // Mapping (in-place)
    // ------------------------------------------------------------------

    /// Replace every stored data value with `function(value)`, in place.
    ///
    /// Mutation is observed by every existing view of this collection.
    ///
    /// # Errors
    ///
    /// [`DatasetError::UnsupportedMap`] on views and concatenations.
    pub fn map_data<F>(&self, mut function: F) -> Result<&Self, DatasetError>
    where
        F: FnMut(D) -> D,
    {
        let mut inner = self.write();
        for item in inner.owned_items_mut()? {
            item.data = function(item.data.clone());
        }
        Ok(self)
    }

    /// Replace stored data values batch-by-batch, in place.
    ///
    /// Items are grouped into contiguous batches of at most `batch_size`
    /// and `function` is called once per batch; it must return exactly as
    /// many values as it was given.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero.
    ///
    /// # Errors
    ///
    /// [`DatasetError::UnsupportedMap`] on views and concatenations;
    /// [`DatasetError::MapContract`] when a batch comes back the wrong
    /// length (earlier batches stay applied).
    pub fn map_data_batched<F>(&self, batch_size: usize, mut function: F) -> Result<&Self, DatasetError>
    where
        F: FnMut(Vec<D>) -> Vec<D>,
    {
        assert!(batch_size > 0, "batch_size must be > 0");
        let mut inner = self.write();
        let items = inner.owned_items_mut()?;
        let len = items.len();
        let mut start = 0;
        while start < len {
            let end = (start + batch_size).min(len);
            let batch: Vec<D> = items[start..end].iter().map(|item| item.data.clone()).collect();
            let mapped = function(batch);
            if mapped.len() != end - start {
                return Err(DatasetError::MapContract {
                    expected: end - start,
                    got: mapped.len(),
                });
            }
            for (item, value) in items[start..end].iter_mut().zip(mapped) {
                item.data = value;
            }
            start = end;
        }
        Ok(self)
    }

    /// Replace every stored target with `function(target)`, in place.
    ///
    /// The function receives `None` for unlabeled items, so a map can label
    /// a collection as well as relabel it. Mapped targets are stored as
    /// returned, without re-normalization.
    ///
    /// # Errors
    ///
    /// [`DatasetError::UnsupportedMap`] on views and concatenations.
    pub fn map_targets<F>(&self, mut function: F) -> Result<&Self, DatasetError>
    where
        F: FnMut(Option<Target>) -> Option<Target>,
    {
        let mut inner = self.write();
        for item in inner.owned_items_mut()? {
            item.target = function(item.target.take());
        }
        Ok(self)
    }

    /// Replace stored targets batch-by-batch, in place.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero.
    ///
    /// # Errors
    ///
    /// Same contract as [`map_data_batched`](Collection::map_data_batched).
    pub fn map_targets_batched<F>(
        &self,
        batch_size: usize,
        mut function: F,
    ) -> Result<&Self, DatasetError>
    where
        F: FnMut(Vec<Option<Target>>) -> Vec<Option<Target>>,
    {
        assert!(batch_size > 0, "batch_size must be > 0");
        let mut inner = self.write();
        let items = inner.owned_items_mut()?;
        let len = items.len();
        let mut start = 0;
        while start < len {
            let end = (start + batch_size).min(len);
            let batch: Vec<Option<Target>> =
                items[start..end].iter().map(|item| item.target.clone()).collect();
            let mapped = function(batch);
            if mapped.len() != end - start {
                return Err(DatasetError::MapContract {
                    expected: end - start,
                    got: mapped.len(),
                });
            }
            for (item, target) in items[start..end].iter_mut().zip(mapped) {
                item.target = target;
            }
            start = end;
        }
        Ok(self)
    }
}

impl<'a, D: Clone + Send + Sync + 'static> IntoIterator for &'a Collection<D> {
    type Item = Sample<D>;
    type IntoIter = Samples<'a, D>;

    fn into_iter(self) -> Samples<'a, D> {
        self.iter()
    }
}

// ============================================================================
// Samples iterator
// ============================================================================

/// Iterator over resolved samples, in index order.
pub struct Samples<'a, D> {
    collection: &'a Collection<D>,
    index: usize,
}

impl<D: Clone + Send + Sync + 'static> Iterator for Samples<'_, D> {
    type Item = Sample<D>;

    fn next(&mut self) -> Option<Sample<D>> {
        let sample = self.collection.resolve(self.index).ok()?;
        self.index += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.collection.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

// ============================================================================
// CollectionBuilder
// ============================================================================

/// Builder for in-memory owning collections.
///
/// # Example
///
/// ```
/// use datakit::{Collection, DataItem};
///
/// let dataset = Collection::builder()
///     .name("digits")
///     .item(DataItem::new(vec![0.0f32; 64]).with_target(3i64))
///     .item(DataItem::new(vec![1.0f32; 64]).with_target(8i64))
///     .build();
///
/// assert_eq!(dataset.len(), 2);
/// assert_eq!(dataset.resolve(0).unwrap().id, "digits-0");
/// ```
#[derive(Debug)]
pub struct CollectionBuilder<D> {
    name: String,
    items: Vec<DataItem<D>>,
    tasks: Option<Vec<TaskDescriptor>>,
}

impl<D> Default for CollectionBuilder<D> {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            items: Vec::new(),
            tasks: None,
        }
    }
}

impl<D: Clone + Send + Sync + 'static> CollectionBuilder<D> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collection name, used to synthesize missing item ids.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Append a batch of items.
    pub fn items(mut self, items: Vec<DataItem<D>>) -> Self {
        self.items.extend(items);
        self
    }

    /// Append a single item.
    pub fn item(mut self, item: DataItem<D>) -> Self {
        self.items.push(item);
        self
    }

    /// Declare task descriptors up front, skipping inference.
    pub fn tasks(mut self, tasks: Vec<TaskDescriptor>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Build the owning collection.
    pub fn build(self) -> Collection<D> {
        Collection::from_node(Node::Owned {
            name: self.name,
            items: self.items,
            tasks: self.tasks,
        })
    }
}
