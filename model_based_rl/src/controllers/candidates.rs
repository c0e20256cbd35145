//! Candidate action sequences and their simulated outcomes.
//!
//! Both containers are stored step-major so that everything the planner
//! needs for horizon step `t` is one contiguous slice:
//!
//! ```text
//! ActionSequences     [t=0: a(0,0) a(1,0) ... a(N-1,0)] [t=1: ...] ... [t=H-1: ...]
//! SimulatedRollouts   [t=0: s(0,0) ... s(N-1,0)]        ...            [t=H: ...]
//! ```

use rand::Rng;

use crate::core::error::{MbrlError, Result};
use crate::environment::ActionSpace;

/// `N` candidate action sequences of length `H` over `A` action dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSequences {
    data: Vec<f32>,
    num_sequences: usize,
    horizon: usize,
    action_dim: usize,
}

impl ActionSequences {
    /// Draw every action of every sequence uniformly from `space`.
    pub fn sample_uniform<R: Rng + ?Sized>(
        space: &ActionSpace,
        num_sequences: usize,
        horizon: usize,
        rng: &mut R,
    ) -> Self {
        let action_dim = space.dim();
        let mut data = Vec::with_capacity(num_sequences * horizon * action_dim);
        for _ in 0..num_sequences * horizon {
            space.sample_into(rng, &mut data);
        }
        Self {
            data,
            num_sequences,
            horizon,
            action_dim,
        }
    }

    /// Build from explicit sequences indexed `[sequence][step][dim]`.
    pub fn from_sequences(sequences: &[Vec<Vec<f32>>]) -> Result<Self> {
        let first = sequences
            .first()
            .ok_or_else(|| MbrlError::invalid_config("candidates", "need at least one sequence"))?;
        let horizon = first.len();
        let action_dim = first.first().map(Vec::len).unwrap_or(0);
        if horizon == 0 || action_dim == 0 {
            return Err(MbrlError::invalid_config("candidates", "empty sequence or action"));
        }

        for seq in sequences {
            if seq.len() != horizon {
                return Err(MbrlError::dimension_mismatch("sequence length", horizon, seq.len()));
            }
            for action in seq {
                if action.len() != action_dim {
                    return Err(MbrlError::dimension_mismatch("action", action_dim, action.len()));
                }
            }
        }

        let num_sequences = sequences.len();
        let mut data = Vec::with_capacity(num_sequences * horizon * action_dim);
        for t in 0..horizon {
            for seq in sequences {
                data.extend_from_slice(&seq[t]);
            }
        }
        Ok(Self {
            data,
            num_sequences,
            horizon,
            action_dim,
        })
    }

    pub fn num_sequences(&self) -> usize {
        self.num_sequences
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    /// Actions of all sequences at step `t`, `[N * A]`.
    pub fn step(&self, t: usize) -> &[f32] {
        let width = self.num_sequences * self.action_dim;
        &self.data[t * width..(t + 1) * width]
    }

    /// Action of sequence `i` at step `t`.
    pub fn action(&self, i: usize, t: usize) -> &[f32] {
        let start = (t * self.num_sequences + i) * self.action_dim;
        &self.data[start..start + self.action_dim]
    }

    /// Copy sequence `i` out as `[step][dim]`.
    pub fn sequence(&self, i: usize) -> Vec<Vec<f32>> {
        (0..self.horizon).map(|t| self.action(i, t).to_vec()).collect()
    }
}

/// Costs (and optionally visited states) of simulated candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRollouts {
    /// Total predicted cost per candidate.
    pub costs: Vec<f32>,
    /// Step-major `[(H + 1) * N * S]`, empty when states were not recorded.
    states: Vec<f32>,
    num_sequences: usize,
    horizon: usize,
    state_dim: usize,
}

impl SimulatedRollouts {
    pub(crate) fn new(
        costs: Vec<f32>,
        states: Vec<f32>,
        num_sequences: usize,
        horizon: usize,
        state_dim: usize,
    ) -> Self {
        Self {
            costs,
            states,
            num_sequences,
            horizon,
            state_dim,
        }
    }

    pub fn num_sequences(&self) -> usize {
        self.num_sequences
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Whether per-step states were kept.
    pub fn has_states(&self) -> bool {
        !self.states.is_empty()
    }

    /// State of candidate `i` after `t` steps (`t = 0` is the start state).
    pub fn state(&self, i: usize, t: usize) -> Option<&[f32]> {
        if !self.has_states() || i >= self.num_sequences || t > self.horizon {
            return None;
        }
        let start = (t * self.num_sequences + i) * self.state_dim;
        Some(&self.states[start..start + self.state_dim])
    }

    /// The `H + 1` states visited by candidate `i`.
    pub fn trajectory(&self, i: usize) -> Option<Vec<Vec<f32>>> {
        (0..=self.horizon)
            .map(|t| self.state(i, t).map(<[f32]>::to_vec))
            .collect()
    }

    /// Index and cost of the cheapest candidate. Ties go to the lowest index.
    pub fn best(&self) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &c) in self.costs.iter().enumerate() {
            match best {
                Some((_, b)) if c >= b => {}
                _ => best = Some((i, c)),
            }
        }
        best
    }
}
