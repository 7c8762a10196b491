// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{IdGen, RunId, SequentialIdGen, ShortId, StepId, UuidIdGen};

#[test]
fn short_truncates_long_ids() {
    let id = RunId::new("abcdef-123456");
    assert_eq!(id.short(6), "abcdef");
    assert_eq!(id.short(64), "abcdef-123456");
    assert_eq!("abc".short(2), "ab");
}

#[test]
fn step_id_compares_with_str() {
    let id = StepId::new("implementer");
    assert_eq!(id, "implementer");
    assert_eq!(id.as_str(), "implementer");
    assert_eq!(id.to_string(), "implementer");
}

#[test]
fn sequential_id_gen_counts_up() {
    let ids = SequentialIdGen::new("run");
    assert_eq!(ids.next(), "run-1");
    assert_eq!(ids.next(), "run-2");

    // Clones share the counter
    let clone = ids.clone();
    assert_eq!(clone.next(), "run-3");
}

#[test]
fn uuid_id_gen_is_unique() {
    let ids = UuidIdGen;
    assert_ne!(ids.next(), ids.next());
}
