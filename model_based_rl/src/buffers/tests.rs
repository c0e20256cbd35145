//! Test suite for dataset storage and aggregation.
//!
//! Test categories:
//! 1. Dataset flattening layout
//! 2. Aggregation size rule and retention strategies
//! 3. Edge cases (empty datasets, ratio bounds, cap)

use std::collections::HashSet;

use super::*;
use crate::core::error::MbrlError;
use crate::core::transition::{Trajectory, Transition};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Trajectory whose single transition is tagged with `id` in the state.
fn tagged(id: usize) -> Trajectory {
    Trajectory::from_transitions(vec![Transition::new(
        vec![id as f32],
        vec![0.0],
        vec![id as f32 + 1.0],
        0.0,
        false,
    )])
}

fn tagged_many(range: std::ops::Range<usize>) -> Vec<Trajectory> {
    range.map(tagged).collect()
}

fn ids(dataset: &Dataset) -> Vec<usize> {
    dataset
        .trajectories()
        .iter()
        .map(|t| t.transitions[0].observation[0] as usize)
        .collect()
}

// =============================================================================
// 1. DATASET
// =============================================================================

#[test]
fn test_flatten_aligns_rows() {
    let traj = Trajectory::from_transitions(vec![
        Transition::new(vec![0.0, 1.0], vec![0.5], vec![1.0, 3.0], 1.0, false),
        Transition::new(vec![1.0, 3.0], vec![-0.5], vec![0.0, 2.0], 1.0, true),
    ]);
    let dataset = Dataset::from_trajectories(vec![traj, tagged_2d(7)]);
    let flat = dataset.flatten().unwrap();

    assert_eq!(flat.len, 3);
    assert_eq!(flat.state_dim, 2);
    assert_eq!(flat.action_dim, 1);
    assert_eq!(flat.state(1), &[1.0, 3.0]);
    assert_eq!(flat.action(1), &[-0.5]);
    assert_eq!(flat.delta(0), &[1.0, 2.0]);
    assert_eq!(flat.delta(1), &[-1.0, -1.0]);
    assert_eq!(flat.state(2), &[7.0, 7.0]);
}

fn tagged_2d(id: usize) -> Trajectory {
    Trajectory::from_transitions(vec![Transition::new(
        vec![id as f32, id as f32],
        vec![0.0],
        vec![id as f32, id as f32],
        0.0,
        false,
    )])
}

#[test]
fn test_flatten_gather() {
    let dataset = Dataset::from_trajectories(tagged_many(0..4));
    let flat = dataset.flatten().unwrap();
    let (states, actions, deltas) = flat.gather(&[3, 1]);
    assert_eq!(states, vec![3.0, 1.0]);
    assert_eq!(actions, vec![0.0, 0.0]);
    assert_eq!(deltas, vec![1.0, 1.0]);
}

#[test]
fn test_flatten_empty_is_error() {
    assert!(matches!(
        Dataset::new().flatten(),
        Err(MbrlError::EmptyDataset { .. })
    ));
    let only_empty = Dataset::from_trajectories(vec![Trajectory::new()]);
    assert!(matches!(only_empty.flatten(), Err(MbrlError::EmptyDataset { .. })));
}

#[test]
fn test_flatten_dimension_mismatch() {
    let dataset = Dataset::from_trajectories(vec![tagged(0), tagged_2d(1)]);
    assert!(matches!(
        dataset.flatten(),
        Err(MbrlError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_counts() {
    let mut dataset = Dataset::new();
    assert!(dataset.is_empty());
    dataset.push(tagged(0));
    dataset.extend(tagged_many(1..3));
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.num_transitions(), 3);
}

// =============================================================================
// 2. AGGREGATION
// =============================================================================

#[test]
fn test_aggregation_size_rule() {
    // 20 old, 10 new, ratio 1/9 -> 10 + floor(20/9) = 12
    let mut buffer = AggregationBuffer::new(UniformSubsample::new(0), DEFAULT_RETENTION_RATIO).unwrap();
    let old = Dataset::from_trajectories(tagged_many(0..20));
    let new = tagged_many(100..110);

    let dataset = buffer.aggregate(old, new);
    assert_eq!(dataset.len(), 12);
}

#[test]
fn test_aggregation_size_rule_many_sizes() {
    for old_len in [0usize, 1, 8, 9, 10, 17, 18, 45] {
        for new_len in [1usize, 5, 10] {
            let mut buffer =
                AggregationBuffer::new(UniformSubsample::new(old_len as u64), DEFAULT_RETENTION_RATIO)
                    .unwrap();
            let old = Dataset::from_trajectories(tagged_many(0..old_len));
            let dataset = buffer.aggregate(old, tagged_many(1000..1000 + new_len));
            assert_eq!(
                dataset.len(),
                new_len + old_len / 9,
                "old={} new={}",
                old_len,
                new_len
            );
        }
    }
}

#[test]
fn test_aggregation_keeps_all_new_and_distinct_old() {
    let mut buffer = AggregationBuffer::new(UniformSubsample::new(3), 0.5).unwrap();
    let old = Dataset::from_trajectories(tagged_many(0..10));
    let dataset = buffer.aggregate(old, tagged_many(100..104));

    let got = ids(&dataset);
    assert_eq!(got.len(), 9);
    assert_eq!(&got[..4], &[100, 101, 102, 103]);

    let retained: HashSet<usize> = got[4..].iter().copied().collect();
    assert_eq!(retained.len(), 5, "sampling must be without replacement");
    assert!(retained.iter().all(|&id| id < 10));
}

#[test]
fn test_uniform_subsample_is_seeded() {
    let run = |seed| {
        let mut buffer = AggregationBuffer::new(UniformSubsample::new(seed), 0.3).unwrap();
        ids(&buffer.aggregate(Dataset::from_trajectories(tagged_many(0..30)), vec![]))
    };
    assert_eq!(run(11), run(11));
}

#[test]
fn test_retain_none() {
    let mut buffer = AggregationBuffer::new(RetainNone, 0.5).unwrap();
    let dataset = buffer.aggregate(Dataset::from_trajectories(tagged_many(0..10)), tagged_many(50..53));
    assert_eq!(ids(&dataset), vec![50, 51, 52]);
}

// =============================================================================
// 3. EDGE CASES
// =============================================================================

#[test]
fn test_ratio_bounds() {
    assert!(AggregationBuffer::new(RetainNone, -0.1).is_err());
    assert!(AggregationBuffer::new(RetainNone, 1.5).is_err());
    assert!(AggregationBuffer::new(RetainNone, f64::NAN).is_err());
    assert!(AggregationBuffer::new(RetainNone, 0.0).is_ok());
    assert!(AggregationBuffer::new(RetainNone, 1.0).is_ok());
}

#[test]
fn test_full_retention() {
    let mut buffer = AggregationBuffer::new(UniformSubsample::new(0), 1.0).unwrap();
    let dataset = buffer.aggregate(Dataset::from_trajectories(tagged_many(0..6)), tagged_many(10..12));
    assert_eq!(dataset.len(), 8);
}

#[test]
fn test_cap_limits_retained_old_only() {
    let mut buffer = AggregationBuffer::new(UniformSubsample::new(0), 1.0)
        .unwrap()
        .with_max_trajectories(Some(2));
    assert_eq!(buffer.retained_count(10), 2);

    let dataset = buffer.aggregate(Dataset::from_trajectories(tagged_many(0..10)), tagged_many(10..15));
    assert_eq!(dataset.len(), 7);
}

// =============================================================================
// 4. PROPERTIES
// =============================================================================

mod proptest_aggregation {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: |D'| = |new| + floor(|old| * ratio), new first, no duplicates
        #[test]
        fn test_aggregation_size_and_uniqueness(
            old_len in 0usize..60,
            new_len in 1usize..20,
            ratio in 0.0f64..=1.0,
            seed in any::<u64>(),
        ) {
            let mut buffer = AggregationBuffer::new(UniformSubsample::new(seed), ratio).unwrap();
            let keep = buffer.retained_count(old_len);
            let exact = old_len as f64 * ratio;
            prop_assert!(keep as f64 <= exact + 1e-6, "kept {} of {}", keep, exact);
            prop_assert!(keep as f64 > exact - 1.0, "kept {} of {}", keep, exact);

            let dataset = buffer.aggregate(
                Dataset::from_trajectories(tagged_many(0..old_len)),
                tagged_many(1000..1000 + new_len),
            );
            prop_assert_eq!(dataset.len(), new_len + keep);

            let ids = ids(&dataset);
            prop_assert_eq!(&ids[..new_len], &(1000..1000 + new_len).collect::<Vec<_>>()[..]);
            prop_assert!(ids[new_len..].iter().all(|&id| id < old_len));

            let unique: HashSet<usize> = ids.iter().copied().collect();
            prop_assert_eq!(unique.len(), ids.len());
        }
    }
}
