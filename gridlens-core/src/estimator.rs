//! Distance-discounted expected reward.

use crate::error::EstimateError;
use crate::record::Position;
use crate::visibility::VisibilityMask;

/// Mean over all reward sources of `gamma^d * value`, where `d` is the
/// Manhattan distance from `start` and `value` is the true reward for seen
/// sources and `belief_mean` for unseen ones.
pub fn discounted_expected_reward(
    start: Position,
    visibility: &VisibilityMask,
    rewards: &[f64],
    positions: &[Position],
    belief_mean: f64,
    gamma: f64,
) -> Result<f64, EstimateError> {
    if rewards.len() != positions.len() || rewards.len() != visibility.len() {
        return Err(EstimateError::LengthMismatch {
            visibility: visibility.len(),
            rewards: rewards.len(),
            positions: positions.len(),
        });
    }
    if rewards.is_empty() {
        return Err(EstimateError::NoRewardSources);
    }

    let total: f64 = rewards
        .iter()
        .zip(positions)
        .enumerate()
        .map(|(idx, (reward, position))| {
            let discount = gamma.powf(start.distance(*position) as f64);
            let value = if visibility.is_seen(idx) {
                *reward
            } else {
                belief_mean
            };
            discount * value
        })
        .sum();

    Ok(total / rewards.len() as f64)
}
