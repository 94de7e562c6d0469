//! Shared fixtures for integration tests.
#![allow(dead_code)]

use datakit::{Collection, DataItem};

/// 100 items: data `i`, id `"item-{i}"`, boolean target `i % 3 == 1`.
pub fn numbers() -> Collection<i64> {
    Collection::builder()
        .name("numbers")
        .items(
            (0..100)
                .map(|i| {
                    DataItem::new(i)
                        .with_id(format!("item-{i}"))
                        .with_target(i % 3 == 1)
                })
                .collect(),
        )
        .build()
}

/// 100 items without explicit ids or targets, named `"numbers"`.
pub fn numbers_unnamed() -> Collection<i64> {
    Collection::builder()
        .name("numbers")
        .items((0..100).map(DataItem::new).collect())
        .build()
}
