//! Task descriptors and target task inference.
//!
//! A [`TaskDescriptor`] records what kind of prediction a target column
//! represents and what shape its output has. Descriptors are either declared
//! up front or inferred once from the stored targets via [`infer_tasks`].

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;
use crate::item::Target;

// ============================================================================
// Descriptor types
// ============================================================================

/// Kind of prediction task a target column represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskKind {
    /// Multi-class, single-label classification.
    Classification,
    /// Two-class classification.
    Binary,
    /// Continuous-valued prediction.
    Regression,
    /// Multi-label classification.
    Multitarget,
    /// Could not be inferred.
    #[default]
    Unknown,
}

impl TaskKind {
    /// Returns true for the single-label discrete kinds.
    pub fn is_classification(&self) -> bool {
        matches!(self, Self::Classification | Self::Binary)
    }

    /// Returns true for continuous-valued tasks.
    pub fn is_regression(&self) -> bool {
        matches!(self, Self::Regression)
    }
}

/// Output shape of a task.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskShape {
    /// Could not be inferred.
    #[default]
    Unknown,
    /// Width of a discrete output (class count or label count).
    Classes(usize),
    /// Dimensions of a continuous output.
    Dims(Vec<usize>),
}

/// Inferred or declared metadata about a prediction target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Task name; `"task"` for single-task targets, the key for mappings.
    pub name: String,
    /// What kind of prediction the target calls for.
    pub kind: TaskKind,
    /// The output shape of that prediction.
    pub shape: TaskShape,
}

impl TaskDescriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, kind: TaskKind, shape: TaskShape) -> Self {
        Self {
            name: name.into(),
            kind,
            shape,
        }
    }
}

// ============================================================================
// Inference
// ============================================================================

/// Classify a stream of targets into a task kind and shape.
///
/// The first target decides which rule applies; the remaining targets only
/// contribute observed maxima. Unrecognized or empty input yields
/// `(Unknown, Unknown)`.
///
/// # Rules
///
/// - Scalar integral: `Classification` of `max` classes when the observed
///   maximum exceeds 1, else `Binary`.
/// - Scalar float: `Regression` with shape `[1]`; tensors keep their shape.
/// - Integral vector: `Multitarget` of `max` labels when any element exceeds
///   1; else `Classification` over the vector width when at most one
///   position is active per sample, `Multitarget` over that width otherwise.
pub fn infer_task<'a, I>(targets: I) -> (TaskKind, TaskShape)
where
    I: IntoIterator<Item = &'a Target>,
{
    let mut rest = targets.into_iter();
    let Some(first) = rest.next() else {
        return (TaskKind::Unknown, TaskShape::Unknown);
    };

    match first {
        Target::Bool(_) => (TaskKind::Binary, TaskShape::Classes(2)),
        Target::Int(value) => {
            let mut max = *value;
            for target in rest {
                if let Target::Int(value) = target {
                    max = max.max(*value);
                }
            }
            if max > 1 {
                (TaskKind::Classification, TaskShape::Classes(max as usize))
            } else {
                (TaskKind::Binary, TaskShape::Classes(2))
            }
        }
        Target::Float(_) => (TaskKind::Regression, TaskShape::Dims(vec![1])),
        Target::Tensor(tensor) => (TaskKind::Regression, TaskShape::Dims(tensor.shape().to_vec())),
        Target::IntVec(first_vec) => {
            let width = first_vec.len();
            let mut max_element = i64::MIN;
            let mut max_sum = i64::MIN;
            for target in std::iter::once(first).chain(rest) {
                if let Target::IntVec(values) = target {
                    max_element = max_element.max(values.iter().copied().max().unwrap_or(i64::MIN));
                    max_sum = max_sum.max(values.iter().sum());
                }
            }
            if max_element > 1 {
                (TaskKind::Multitarget, TaskShape::Classes(max_element as usize))
            } else if max_sum <= 1 {
                (TaskKind::Classification, TaskShape::Classes(width))
            } else {
                (TaskKind::Multitarget, TaskShape::Classes(width))
            }
        }
        Target::Map(_) => (TaskKind::Unknown, TaskShape::Unknown),
    }
}

/// Infer one descriptor per task from a collection's stored targets.
///
/// Mapping targets produce one descriptor per key, named after the key;
/// anything else produces a single descriptor named `"task"`. Items without
/// a target contribute nothing.
pub fn infer_tasks<'a, I>(targets: I) -> Vec<TaskDescriptor>
where
    I: IntoIterator<Item = &'a Target>,
    I::IntoIter: Clone,
{
    let iter = targets.into_iter();
    let Some(first) = iter.clone().next() else {
        return Vec::new();
    };

    if let Target::Map(tasks) = first {
        tasks
            .keys()
            .map(|key| {
                let per_key = iter.clone().filter_map(move |target| match target {
                    Target::Map(map) => map.get(key),
                    _ => None,
                });
                let (kind, shape) = infer_task(per_key);
                TaskDescriptor::new(key.clone(), kind, shape)
            })
            .collect()
    } else {
        let (kind, shape) = infer_task(iter);
        vec![TaskDescriptor::new("task", kind, shape)]
    }
}

// ============================================================================
// Merging
// ============================================================================

/// Merge the task descriptors of two containers being concatenated.
///
/// Names present on only one side pass through; names present on both must
/// agree on kind and shape.
///
/// # Errors
///
/// [`DatasetError::TaskConflict`] when a shared name disagrees.
pub fn merge_tasks(
    left: &[TaskDescriptor],
    right: &[TaskDescriptor],
) -> Result<Vec<TaskDescriptor>, DatasetError> {
    let mut merged: Vec<TaskDescriptor> = left.to_vec();
    for task in right {
        match merged.iter().find(|existing| existing.name == task.name) {
            None => merged.push(task.clone()),
            Some(existing) => {
                if existing.kind != task.kind {
                    return Err(DatasetError::TaskConflict {
                        name: task.name.clone(),
                        field: "kind",
                        left: format!("{:?}", existing.kind),
                        right: format!("{:?}", task.kind),
                    });
                }
                if existing.shape != task.shape {
                    return Err(DatasetError::TaskConflict {
                        name: task.name.clone(),
                        field: "shape",
                        left: format!("{:?}", existing.shape),
                        right: format!("{:?}", task.shape),
                    });
                }
            }
        }
    }
    Ok(merged)
}
