//! Rollout collection.

use crate::controllers::Policy;
use crate::core::error::{MbrlError, Result};
use crate::core::transition::{Trajectory, Transition};
use crate::environment::Environment;

/// Runs a policy in an environment and records what happened.
pub struct Sampler;

impl Sampler {
    /// Collect `num_rollouts` trajectories of at most `horizon` steps.
    ///
    /// Each rollout starts from `env.reset()` and ends after `horizon` steps
    /// or when the environment reports `done`, whichever comes first. An
    /// environment or policy failure aborts the whole call.
    pub fn rollout<E, P>(
        env: &mut E,
        policy: &mut P,
        num_rollouts: usize,
        horizon: usize,
    ) -> Result<Vec<Trajectory>>
    where
        E: Environment + ?Sized,
        P: Policy + ?Sized,
    {
        if num_rollouts == 0 {
            return Err(MbrlError::invalid_config("num_rollouts", "must be > 0"));
        }
        if horizon == 0 {
            return Err(MbrlError::invalid_config("horizon", "must be > 0"));
        }

        let mut trajectories = Vec::with_capacity(num_rollouts);
        for i in 0..num_rollouts {
            let trajectory = Self::rollout_one(env, policy, horizon)?;
            log::debug!(
                "rollout {}/{}: {} steps, return {:.3}{}",
                i + 1,
                num_rollouts,
                trajectory.len(),
                trajectory.episode_return(),
                if trajectory.terminated() { " (terminated)" } else { "" }
            );
            trajectories.push(trajectory);
        }
        Ok(trajectories)
    }

    /// Collect a single trajectory.
    pub fn rollout_one<E, P>(env: &mut E, policy: &mut P, horizon: usize) -> Result<Trajectory>
    where
        E: Environment + ?Sized,
        P: Policy + ?Sized,
    {
        let obs_size = env.observation_size();
        let action_dim = env.action_space().dim();

        let mut observation = env.reset()?;
        check_len("reset observation", obs_size, observation.len())?;

        let mut trajectory = Trajectory::with_capacity(horizon);
        for _ in 0..horizon {
            let action = policy.get_action(&observation)?;
            check_len("policy action", action_dim, action.len())?;

            let step = env.step(&action)?;
            check_len("step observation", obs_size, step.observation.len())?;

            let next_observation = step.observation;
            trajectory.push(Transition::new(
                observation,
                action,
                next_observation.clone(),
                step.reward,
                step.done,
            ));
            observation = next_observation;
            if step.done {
                break;
            }
        }
        Ok(trajectory)
    }
}

fn check_len(what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(MbrlError::dimension_mismatch(what, expected, actual));
    }
    Ok(())
}
