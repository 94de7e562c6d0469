//! Data items, target values, and resolved samples.
//!
//! [`DataItem`] is the leaf record an owning collection stores: an optional
//! id, a data payload, and an optional [`Target`]. Targets are normalized at
//! construction so the rest of the crate never sees degenerate sequences.

use std::collections::BTreeMap;

use ndarray::{Array1, ArrayD};

// ============================================================================
// Target
// ============================================================================

/// A target value attached to a data item.
///
/// This is a closed set of value kinds, chosen so the task inference engine
/// in [`crate::task`] can classify any target it encounters: scalars, label
/// vectors, float tensors, and named multi-task mappings.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A binary label.
    Bool(bool),
    /// An integral label (class index).
    Int(i64),
    /// A scalar regression value.
    Float(f32),
    /// A vector of integral labels (one-hot or multi-hot encodings).
    IntVec(Vec<i64>),
    /// A float tensor of any rank (flat sequences are rank 1).
    Tensor(ArrayD<f32>),
    /// Named per-task targets.
    Map(BTreeMap<String, Target>),
}

impl Target {
    /// Normalize a freshly attached target.
    ///
    /// Empty sequences collapse to `None` and single-element sequences
    /// collapse to their element. Scalars and mappings pass through.
    pub(crate) fn normalize(self) -> Option<Target> {
        match self {
            Target::IntVec(v) if v.is_empty() => None,
            Target::IntVec(v) if v.len() == 1 => Some(Target::Int(v[0])),
            Target::Tensor(t) if t.is_empty() => None,
            Target::Tensor(t) if t.len() == 1 => t.iter().next().copied().map(Target::Float),
            other => Some(other),
        }
    }
}

impl From<bool> for Target {
    fn from(value: bool) -> Self {
        Target::Bool(value)
    }
}

impl From<i64> for Target {
    fn from(value: i64) -> Self {
        Target::Int(value)
    }
}

impl From<i32> for Target {
    fn from(value: i32) -> Self {
        Target::Int(i64::from(value))
    }
}

impl From<f32> for Target {
    fn from(value: f32) -> Self {
        Target::Float(value)
    }
}

impl From<Vec<i64>> for Target {
    fn from(values: Vec<i64>) -> Self {
        Target::IntVec(values)
    }
}

impl From<Vec<f32>> for Target {
    fn from(values: Vec<f32>) -> Self {
        Target::Tensor(Array1::from(values).into_dyn())
    }
}

impl From<ArrayD<f32>> for Target {
    fn from(values: ArrayD<f32>) -> Self {
        Target::Tensor(values)
    }
}

impl From<BTreeMap<String, Target>> for Target {
    fn from(tasks: BTreeMap<String, Target>) -> Self {
        Target::Map(tasks)
    }
}

// ============================================================================
// DataItem
// ============================================================================

/// A single labeled example inside an owning collection.
///
/// # Example
///
/// ```
/// use datakit::DataItem;
///
/// let item = DataItem::new("the quick brown fox")
///     .with_id("sentence-0")
///     .with_target(1i64);
///
/// let (id, data, target) = item.into_parts();
/// assert_eq!(id.as_deref(), Some("sentence-0"));
/// assert_eq!(data, "the quick brown fox");
/// ```
#[derive(Debug, Clone)]
pub struct DataItem<D> {
    pub(crate) id: Option<String>,
    pub(crate) data: D,
    pub(crate) target: Option<Target>,
}

impl<D> DataItem<D> {
    /// Create an item with no id and no target.
    pub fn new(data: D) -> Self {
        Self {
            id: None,
            data,
            target: None,
        }
    }

    /// Attach a unique id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach a target, normalizing it per the collapse policy.
    pub fn with_target(mut self, target: impl Into<Target>) -> Self {
        self.target = target.into().normalize();
        self
    }

    /// The item's id, if one was set.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The item's data payload.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// The item's target, if one survives normalization.
    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// Destructure into `(id, data, target)`.
    pub fn into_parts(self) -> (Option<String>, D, Option<Target>) {
        (self.id, self.data, self.target)
    }
}

// ============================================================================
// Sample
// ============================================================================

/// A resolved example: what [`Collection::resolve`](crate::Collection::resolve)
/// returns after id synthesis and transform application.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<D> {
    /// The item's id, synthesized as `"{name}-{index}"` when absent.
    pub id: String,
    /// The data payload after the data transform chains.
    pub data: D,
    /// The target after the target transform chains.
    pub target: Option<Target>,
}

impl<D> Sample<D> {
    /// Destructure into `(id, data, target)`.
    pub fn into_parts(self) -> (String, D, Option<Target>) {
        (self.id, self.data, self.target)
    }
}
