//! Batch collation helpers.
//!
//! Training loops typically consume batches of data and targets while
//! keeping example ids on the side for bookkeeping. [`split_ids`] performs
//! that separation; [`collate_with`] additionally hands the separated
//! columns to a caller-supplied collation function (stacking into an
//! `ndarray`, padding sequences, and so on).

use crate::item::{Sample, Target};

/// Separate a batch of samples into parallel id, data, and target columns.
pub fn split_ids<D>(samples: Vec<Sample<D>>) -> (Vec<String>, Vec<D>, Vec<Option<Target>>) {
    let mut ids = Vec::with_capacity(samples.len());
    let mut data = Vec::with_capacity(samples.len());
    let mut targets = Vec::with_capacity(samples.len());
    for sample in samples {
        let (id, value, target) = sample.into_parts();
        ids.push(id);
        data.push(value);
        targets.push(target);
    }
    (ids, data, targets)
}

/// Collate a batch of samples, keeping ids out of the collated value.
///
/// # Example
///
/// ```
/// use datakit::{collate_with, Collection, DataItem};
///
/// let dataset = Collection::from_items(
///     (0..3).map(|i| DataItem::new(i as f32)).collect(),
/// );
/// let (ids, sum) = collate_with(dataset.examples(3), |data, _targets| {
///     data.into_iter().sum::<f32>()
/// });
/// assert_eq!(ids.len(), 3);
/// assert_eq!(sum, 3.0);
/// ```
pub fn collate_with<D, B, F>(samples: Vec<Sample<D>>, collate: F) -> (Vec<String>, B)
where
    F: FnOnce(Vec<D>, Vec<Option<Target>>) -> B,
{
    let (ids, data, targets) = split_ids(samples);
    (ids, collate(data, targets))
}
