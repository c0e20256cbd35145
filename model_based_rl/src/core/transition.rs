//! Transition and trajectory types.
//!
//! - `Transition`: one recorded environment step
//! - `Trajectory`: the ordered transitions of one rollout (a "path")
//!
//! Both are produced by the sampler and treated as read-only afterwards.

/// One recorded environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// State observed before acting
    pub observation: Vec<f32>,
    /// Continuous action vector that was applied
    pub action: Vec<f32>,
    /// State observed after acting
    pub next_observation: Vec<f32>,
    /// Reward received
    pub reward: f32,
    /// Environment signalled termination on this step
    pub terminal: bool,
}

impl Transition {
    /// Create a new transition.
    pub fn new(
        observation: Vec<f32>,
        action: Vec<f32>,
        next_observation: Vec<f32>,
        reward: f32,
        terminal: bool,
    ) -> Self {
        Self {
            observation,
            action,
            next_observation,
            reward,
            terminal,
        }
    }

    /// State change `next_observation - observation`.
    pub fn delta(&self) -> Vec<f32> {
        self.next_observation
            .iter()
            .zip(&self.observation)
            .map(|(next, cur)| next - cur)
            .collect()
    }
}

/// Trajectory: ordered transitions from one rollout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    /// Ordered sequence of transitions
    pub transitions: Vec<Transition>,
}

impl Trajectory {
    /// Create a new empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trajectory with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transitions: Vec::with_capacity(capacity),
        }
    }

    /// Build a trajectory from already recorded transitions.
    pub fn from_transitions(transitions: Vec<Transition>) -> Self {
        Self { transitions }
    }

    /// Add a transition to the trajectory.
    pub fn push(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Get the number of transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if the trajectory is empty.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Iterate over transitions.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    /// Observations `s_t`.
    pub fn observations(&self) -> Vec<&[f32]> {
        self.iter().map(|t| t.observation.as_slice()).collect()
    }

    /// Actions `a_t`.
    pub fn actions(&self) -> Vec<&[f32]> {
        self.iter().map(|t| t.action.as_slice()).collect()
    }

    /// Next observations `s_{t+1}`.
    pub fn next_observations(&self) -> Vec<&[f32]> {
        self.iter().map(|t| t.next_observation.as_slice()).collect()
    }

    /// Rewards `r_t`.
    pub fn rewards(&self) -> Vec<f32> {
        self.iter().map(|t| t.reward).collect()
    }

    /// Total undiscounted return.
    pub fn episode_return(&self) -> f32 {
        self.iter().map(|t| t.reward).sum()
    }

    /// Whether the rollout ended on environment termination (not the horizon).
    pub fn terminated(&self) -> bool {
        self.transitions.last().map(|t| t.terminal).unwrap_or(false)
    }
}
