//! Trajectory dataset used to fit the dynamics model.

use crate::core::error::{MbrlError, Result};
use crate::core::transition::Trajectory;

/// Unordered collection of trajectories.
///
/// Grows by appending whole trajectories and shrinks only through a
/// [`RetentionStrategy`](super::RetentionStrategy) during aggregation.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    trajectories: Vec<Trajectory>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing trajectories.
    pub fn from_trajectories(trajectories: Vec<Trajectory>) -> Self {
        Self { trajectories }
    }

    /// Append one trajectory.
    pub fn push(&mut self, trajectory: Trajectory) {
        self.trajectories.push(trajectory);
    }

    /// Append many trajectories.
    pub fn extend(&mut self, trajectories: impl IntoIterator<Item = Trajectory>) {
        self.trajectories.extend(trajectories);
    }

    /// Number of trajectories.
    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    /// No trajectories at all.
    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Total number of transitions over all trajectories.
    pub fn num_transitions(&self) -> usize {
        self.trajectories.iter().map(Trajectory::len).sum()
    }

    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }

    pub fn into_trajectories(self) -> Vec<Trajectory> {
        self.trajectories
    }

    /// Concatenate every transition into aligned row-major arrays.
    ///
    /// Fails with [`MbrlError::EmptyDataset`] if there are no transitions and
    /// with [`MbrlError::DimensionMismatch`] if rows disagree on dimension.
    pub fn flatten(&self) -> Result<FlatTransitions> {
        let first = self
            .trajectories
            .iter()
            .flat_map(|t| t.iter())
            .next()
            .ok_or_else(|| MbrlError::empty_dataset("flattening dataset"))?;
        let state_dim = first.observation.len();
        let action_dim = first.action.len();
        let len = self.num_transitions();

        let mut states = Vec::with_capacity(len * state_dim);
        let mut actions = Vec::with_capacity(len * action_dim);
        let mut deltas = Vec::with_capacity(len * state_dim);

        for transition in self.trajectories.iter().flat_map(|t| t.iter()) {
            if transition.observation.len() != state_dim {
                return Err(MbrlError::dimension_mismatch(
                    "observation",
                    state_dim,
                    transition.observation.len(),
                ));
            }
            if transition.next_observation.len() != state_dim {
                return Err(MbrlError::dimension_mismatch(
                    "next_observation",
                    state_dim,
                    transition.next_observation.len(),
                ));
            }
            if transition.action.len() != action_dim {
                return Err(MbrlError::dimension_mismatch(
                    "action",
                    action_dim,
                    transition.action.len(),
                ));
            }
            states.extend_from_slice(&transition.observation);
            actions.extend_from_slice(&transition.action);
            deltas.extend(transition.delta());
        }

        Ok(FlatTransitions {
            states,
            actions,
            deltas,
            state_dim,
            action_dim,
            len,
        })
    }
}

impl From<Vec<Trajectory>> for Dataset {
    fn from(trajectories: Vec<Trajectory>) -> Self {
        Self::from_trajectories(trajectories)
    }
}

/// All transitions of a dataset as aligned flat arrays.
///
/// Row `i` of `states`, `actions` and `deltas` belong to the same transition.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTransitions {
    /// `[len * state_dim]`
    pub states: Vec<f32>,
    /// `[len * action_dim]`
    pub actions: Vec<f32>,
    /// `[len * state_dim]`, `s' - s`
    pub deltas: Vec<f32>,
    pub state_dim: usize,
    pub action_dim: usize,
    pub len: usize,
}

impl FlatTransitions {
    pub fn state(&self, i: usize) -> &[f32] {
        &self.states[i * self.state_dim..(i + 1) * self.state_dim]
    }

    pub fn action(&self, i: usize) -> &[f32] {
        &self.actions[i * self.action_dim..(i + 1) * self.action_dim]
    }

    pub fn delta(&self, i: usize) -> &[f32] {
        &self.deltas[i * self.state_dim..(i + 1) * self.state_dim]
    }

    /// Copy the rows at `indices` into `(states, actions, deltas)` buffers.
    pub fn gather(&self, indices: &[usize]) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
        let mut states = Vec::with_capacity(indices.len() * self.state_dim);
        let mut actions = Vec::with_capacity(indices.len() * self.action_dim);
        let mut deltas = Vec::with_capacity(indices.len() * self.state_dim);
        for &i in indices {
            states.extend_from_slice(self.state(i));
            actions.extend_from_slice(self.action(i));
            deltas.extend_from_slice(self.delta(i));
        }
        (states, actions, deltas)
    }
}
