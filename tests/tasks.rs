//! Task inference through the container interface.

mod common;

use datakit::{Collection, DataItem, TaskDescriptor, TaskKind, TaskShape, Target};

#[test]
fn boolean_targets_infer_a_binary_task() {
    let tasks = common::numbers().tasks();
    assert_eq!(
        tasks,
        vec![TaskDescriptor::new(
            "task",
            TaskKind::Binary,
            TaskShape::Classes(2)
        )]
    );
}

#[test]
fn unlabeled_collections_have_no_tasks() {
    assert!(common::numbers_unnamed().tasks().is_empty());
}

#[test]
fn integer_labels_infer_class_counts() {
    let dataset = Collection::from_items(
        [0i64, 3, 1, 2]
            .into_iter()
            .map(|label| DataItem::new(()).with_target(label))
            .collect(),
    );
    assert_eq!(
        dataset.tasks(),
        vec![TaskDescriptor::new(
            "task",
            TaskKind::Classification,
            TaskShape::Classes(3)
        )]
    );
}

#[test]
fn float_labels_infer_regression() {
    let dataset = Collection::from_items(vec![
        DataItem::new(()).with_target(1.5f32),
        DataItem::new(()).with_target(-0.5f32),
    ]);
    assert_eq!(dataset.tasks()[0].kind, TaskKind::Regression);
    assert_eq!(dataset.tasks()[0].shape, TaskShape::Dims(vec![1]));
}

#[test]
fn multi_hot_labels_infer_multitarget() {
    let dataset = Collection::from_items(vec![
        DataItem::new(()).with_target(vec![1i64, 0, 1]),
        DataItem::new(()).with_target(vec![0i64, 1, 0]),
    ]);
    assert_eq!(
        dataset.tasks(),
        vec![TaskDescriptor::new(
            "task",
            TaskKind::Multitarget,
            TaskShape::Classes(3)
        )]
    );
}

#[test]
fn unlabeled_items_do_not_disturb_inference() {
    let dataset = Collection::from_items(vec![
        DataItem::new(()),
        DataItem::new(()).with_target(0.25f32),
        DataItem::new(()),
    ]);
    assert_eq!(dataset.tasks()[0].kind, TaskKind::Regression);
}

#[test]
fn declared_tasks_skip_inference() {
    let declared = TaskDescriptor::new("rating", TaskKind::Regression, TaskShape::Dims(vec![1]));
    let dataset = Collection::builder()
        .item(DataItem::new(()).with_target(true))
        .tasks(vec![declared.clone()])
        .build();
    assert_eq!(dataset.tasks(), vec![declared]);
}

#[test]
fn views_report_their_parent_tasks() {
    let dataset = common::numbers();
    let view = dataset.slice(0..2);
    assert_eq!(view.tasks(), dataset.tasks());

    let (train, test) = dataset.split(0.5, Some(3));
    assert_eq!(train.tasks(), test.tasks());
}

#[test]
fn inference_runs_once_and_is_cached() {
    let dataset = common::numbers();
    let before = dataset.tasks();
    assert_eq!(before[0].kind, TaskKind::Binary);

    // Relabeling after the fact does not re-run inference.
    dataset
        .map_targets(|_| Some(Target::Float(0.0)))
        .unwrap();
    assert_eq!(dataset.tasks(), before);
}

#[test]
fn mapping_targets_infer_one_task_per_key() {
    let item = |label: i64, score: f32| {
        let mut target = std::collections::BTreeMap::new();
        target.insert("label".to_string(), Target::Int(label));
        target.insert("score".to_string(), Target::Float(score));
        DataItem::new(()).with_target(Target::Map(target))
    };
    let dataset = Collection::from_items(vec![item(2, 0.1), item(0, 0.9)]);
    assert_eq!(
        dataset.tasks(),
        vec![
            TaskDescriptor::new("label", TaskKind::Classification, TaskShape::Classes(2)),
            TaskDescriptor::new("score", TaskKind::Regression, TaskShape::Dims(vec![1])),
        ]
    );
}
