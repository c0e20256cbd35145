//! Per-iteration cost and return statistics.

use crate::core::error::{MbrlError, Result};
use crate::core::transition::Trajectory;
use crate::cost::CostFunction;

/// Mean, population std, min and max of a set of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub mean: f32,
    pub std: f32,
    pub min: f32,
    pub max: f32,
}

impl SummaryStats {
    /// Summarize `values`. `None` if empty.
    pub fn from_values(values: &[f32]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
        let var = values
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        Some(Self {
            mean: mean as f32,
            std: var.sqrt() as f32,
            min: values.iter().copied().fold(f32::INFINITY, f32::min),
            max: values.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        })
    }
}

/// Metrics recorded after one training iteration's on-policy rollouts.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationSnapshot {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Task cost per on-policy trajectory.
    pub cost: SummaryStats,
    /// Undiscounted return per on-policy trajectory.
    pub returns: SummaryStats,
    /// Trajectories in the dataset after aggregation.
    pub dataset_trajectories: usize,
    /// Final epoch loss of this iteration's model fit.
    pub model_loss: Option<f32>,
}

impl IterationSnapshot {
    /// Metric names, in reporting order.
    pub const METRIC_NAMES: [&'static str; 8] = [
        "AverageCost",
        "StdCost",
        "MinimumCost",
        "MaximumCost",
        "AverageReturn",
        "StdReturn",
        "MinimumReturn",
        "MaximumReturn",
    ];

    /// Summarize on-policy `trajectories` under `cost`.
    pub fn from_trajectories<C: CostFunction>(
        iteration: usize,
        trajectories: &[Trajectory],
        cost: &C,
    ) -> Result<Self> {
        let costs: Vec<f32> = trajectories.iter().map(|t| cost.trajectory_cost(t)).collect();
        let returns: Vec<f32> = trajectories.iter().map(Trajectory::episode_return).collect();

        let empty = || MbrlError::empty_dataset("summarizing iteration metrics");
        Ok(Self {
            iteration,
            cost: SummaryStats::from_values(&costs).ok_or_else(empty)?,
            returns: SummaryStats::from_values(&returns).ok_or_else(empty)?,
            dataset_trajectories: 0,
            model_loss: None,
        })
    }

    /// Set the post-aggregation dataset size.
    pub fn with_dataset_trajectories(mut self, n: usize) -> Self {
        self.dataset_trajectories = n;
        self
    }

    /// Set the model fit loss.
    pub fn with_model_loss(mut self, loss: f32) -> Self {
        self.model_loss = Some(loss);
        self
    }

    /// The eight reported metrics as `(name, value)` pairs.
    pub fn named_values(&self) -> [(&'static str, f32); 8] {
        let n = Self::METRIC_NAMES;
        [
            (n[0], self.cost.mean),
            (n[1], self.cost.std),
            (n[2], self.cost.min),
            (n[3], self.cost.max),
            (n[4], self.returns.mean),
            (n[5], self.returns.std),
            (n[6], self.returns.min),
            (n[7], self.returns.max),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transition::Transition;
    use crate::cost::FnCost;

    fn trajectory_with_rewards(rewards: &[f32]) -> Trajectory {
        Trajectory::from_transitions(
            rewards
                .iter()
                .map(|&r| Transition::new(vec![0.0], vec![0.0], vec![0.0], r, false))
                .collect(),
        )
    }

    #[test]
    fn test_summary_stats() {
        let s = SummaryStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((s.mean - 5.0).abs() < 1e-6);
        assert!((s.std - 2.0).abs() < 1e-6);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert!(SummaryStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_return_reporting() {
        let trajs = vec![
            trajectory_with_rewards(&[1.0, 2.0, 3.0]),
            trajectory_with_rewards(&[4.0, 5.0, 6.0]),
            trajectory_with_rewards(&[7.0, 8.0, 9.0]),
        ];
        let cost = FnCost::new(|_: &[f32], _: &[f32], _: &[f32]| 1.0);
        let snapshot = IterationSnapshot::from_trajectories(0, &trajs, &cost).unwrap();

        let values: std::collections::HashMap<_, _> = snapshot.named_values().into_iter().collect();
        assert_eq!(values["AverageReturn"], 15.0);
        assert_eq!(values["MinimumReturn"], 6.0);
        assert_eq!(values["MaximumReturn"], 24.0);
        assert!((values["StdReturn"] - 54.0f32.sqrt()).abs() < 1e-4);

        assert_eq!(values["AverageCost"], 3.0);
        assert_eq!(values["StdCost"], 0.0);
    }

    #[test]
    fn test_named_values_order() {
        let trajs = vec![trajectory_with_rewards(&[1.0])];
        let cost = FnCost::new(|_: &[f32], _: &[f32], _: &[f32]| 0.0);
        let snapshot = IterationSnapshot::from_trajectories(2, &trajs, &cost).unwrap();

        let names: Vec<&str> = snapshot.named_values().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, IterationSnapshot::METRIC_NAMES.to_vec());
    }

    #[test]
    fn test_empty_trajectories_is_error() {
        let cost = FnCost::new(|_: &[f32], _: &[f32], _: &[f32]| 0.0);
        assert!(matches!(
            IterationSnapshot::from_trajectories(0, &[], &cost),
            Err(MbrlError::EmptyDataset { .. })
        ));
    }
}
