//! Integration tests for the rewrite flow
//!
//! Builds a ledger from an on-disk block index, applies an edit plan and
//! checks the bytes of the container written back out.

use super::common::fixtures::{TestContainer, HEADER, RECORDS};
use capsplice::{BlockError, BlockIndex, BlockLedger, Edit, EditPlan, PlanError};
use proptest::prelude::*;
use std::fs;

fn ledger_for(container: &TestContainer) -> BlockLedger {
    BlockIndex::read_from_path(&container.index)
        .expect("Failed to read block index")
        .build_ledger()
        .expect("Failed to build ledger")
}

/// Test that a ledger without edits reproduces the source byte for byte
#[test]
fn test_unmodified_rewrite_is_identical() {
    let container = TestContainer::new();
    let ledger = ledger_for(&container);
    let output = container.path("out.cap");

    ledger
        .write_container(&container.source, &output)
        .expect("Failed to write container");

    let source = fs::read(&container.source).unwrap();
    let written = fs::read(&output).unwrap();
    assert_eq!(written, source);
}

/// Test that the index maps onto the expected header and record sizes
#[test]
fn test_index_layout() {
    let container = TestContainer::new();
    let ledger = ledger_for(&container);

    assert_eq!(ledger.header_size(), HEADER.len() as u64);
    assert_eq!(ledger.block_count(), RECORDS.len());
    for (primary, record) in RECORDS.iter().enumerate() {
        let block = ledger.original_block(primary).expect("block should exist");
        assert_eq!(block.size, record.len() as u64);
    }
    assert_eq!(container.offsets().len(), RECORDS.len() + 1);
}

/// Test insert, replace and delete edits together
#[test]
fn test_edit_plan_rewrite() {
    let container = TestContainer::new();
    let mut ledger = ledger_for(&container);

    let plan = EditPlan {
        edits: vec![
            Edit::with_bytes(0, -1, b"pre-"),
            Edit::with_bytes(1, 0, b"BRAVO"),
            Edit::delete(2),
            Edit::with_bytes(2, 1, b"-post"),
        ],
    };
    let plan_path = container.path("edits.json");
    plan.write_to_path(&plan_path).unwrap();

    let plan = EditPlan::read_from_path(&plan_path).expect("Failed to read edit plan");
    plan.apply(&mut ledger).expect("Failed to apply edit plan");
    assert_eq!(ledger.modification_count(), 4);

    let output = container.path("out.cap");
    ledger
        .write_container_with_chunk_size(&container.source, &output, 3)
        .expect("Failed to write container");

    let written = fs::read(&output).unwrap();
    assert_eq!(written, b"CAP1pre-alphaBRAVO-post".to_vec());
}

/// Test that clearing modifications restores the original layout
#[test]
fn test_clear_modifications_restores_source() {
    let container = TestContainer::new();
    let mut ledger = ledger_for(&container);

    ledger.add_modification(0, 0, None).unwrap();
    ledger.add_modification(1, 5, Some(b"x".to_vec())).unwrap();
    ledger.clear_all_modifications();

    let output = container.path("out.cap");
    ledger.write_container(&container.source, &output).unwrap();
    assert_eq!(fs::read(&output).unwrap(), fs::read(&container.source).unwrap());
}

/// Test that a deletion away from secondary 0 rejects the plan
#[test]
fn test_edit_plan_rejects_misplaced_deletion() {
    let container = TestContainer::new();
    let mut ledger = ledger_for(&container);

    let plan = EditPlan {
        edits: vec![
            Edit::with_bytes(0, 0, b"ok"),
            Edit {
                primary: 1,
                secondary: 2,
                payload: None,
            },
        ],
    };

    let err = plan.apply(&mut ledger).unwrap_err();
    assert!(matches!(
        err,
        PlanError::Rejected {
            index: 1,
            source: BlockError::TombstoneNotAtZero {
                primary: 1,
                secondary: 2
            }
        }
    ));
    // Edits before the rejection stay registered
    assert!(ledger.modification_exists(0, 0));
}

/// Test that an edit plan cannot overwrite an existing modification
#[test]
fn test_edit_plan_rejects_duplicate_slot() {
    let container = TestContainer::new();
    let mut ledger = ledger_for(&container);

    let plan = EditPlan {
        edits: vec![Edit::with_bytes(2, -1, b"a"), Edit::with_bytes(2, -1, b"b")],
    };

    assert!(matches!(
        plan.apply(&mut ledger),
        Err(PlanError::Rejected {
            index: 1,
            source: BlockError::ModificationExists { .. }
        })
    ));
}

/// Test that invalid base64 is reported with the edit's position
#[test]
fn test_edit_plan_rejects_bad_payload() {
    let container = TestContainer::new();
    let mut ledger = ledger_for(&container);

    let plan_path = container.path("edits.json");
    fs::write(
        &plan_path,
        r#"{"edits":[{"primary":0,"payload":"!!not base64!!"}]}"#,
    )
    .unwrap();

    let plan = EditPlan::read_from_path(&plan_path).unwrap();
    assert!(matches!(
        plan.apply(&mut ledger),
        Err(PlanError::Payload { index: 0, .. })
    ));
    assert_eq!(ledger.modification_count(), 0);
}

/// Test that an empty replacement aborts the write and leaves a partial file
#[test]
fn test_empty_payload_aborts_write() {
    let container = TestContainer::new();
    let mut ledger = ledger_for(&container);
    ledger.add_modification(1, 0, Some(Vec::new())).unwrap();

    let output = container.path("out.cap");
    let err = ledger
        .write_container(&container.source, &output)
        .unwrap_err();
    assert!(matches!(
        err,
        BlockError::EmptyPayload {
            primary: 1,
            secondary: 0
        }
    ));

    let written = fs::read(&output).unwrap();
    assert_eq!(written, b"CAP1alpha".to_vec());
}

/// Test that a missing source file is reported as an IO error
#[test]
fn test_missing_source_is_io_error() {
    let container = TestContainer::new();
    let ledger = ledger_for(&container);

    let err = ledger
        .write_container(&container.path("missing.cap"), &container.path("out.cap"))
        .unwrap_err();
    assert!(matches!(err, BlockError::Io(_)));
}

proptest! {
    /// Finalized sizes always tile the range between the header and the sentinel
    #[test]
    fn prop_finalized_sizes_cover_file(
        start in 0u64..1024,
        gaps in prop::collection::vec(1u64..512, 1..32),
    ) {
        let mut offsets = vec![start];
        for gap in &gaps {
            let next = offsets[offsets.len() - 1] + gap;
            offsets.push(next);
        }

        let ledger = BlockLedger::from_offsets(&offsets).unwrap();
        prop_assert_eq!(ledger.header_size(), start);
        prop_assert_eq!(ledger.block_count(), gaps.len());

        let total: u64 = (0..ledger.block_count())
            .map(|primary| ledger.original_block(primary).unwrap().size)
            .sum();
        prop_assert_eq!(total, offsets[offsets.len() - 1] - start);
    }
}
