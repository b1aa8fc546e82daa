use std::collections::HashMap;

use gridtune::pruner::{MedianPruner, Pruner};
use gridtune::sampler::CompletedTrial;
use gridtune::{Direction, TrialState};

/// Builds a completed trial whose intermediate value at step `i` is
/// `values[i]`.
fn trial_with_values(id: u64, values: &[f64]) -> CompletedTrial {
    let intermediate = values
        .iter()
        .enumerate()
        .map(|(step, &v)| (step as u64, v))
        .collect();
    CompletedTrial::with_intermediate_values(
        id,
        HashMap::new(),
        HashMap::new(),
        HashMap::new(),
        *values.last().unwrap(),
        intermediate,
        HashMap::new(),
    )
}

#[test]
fn below_median_trial_is_pruned_when_minimizing() {
    let history = vec![
        trial_with_values(0, &[1.0, 1.0]),
        trial_with_values(1, &[2.0, 2.0]),
        trial_with_values(2, &[3.0, 3.0]),
    ];
    let pruner = MedianPruner::new(Direction::Minimize);

    // 5.0 is worse than the median 2.0 at step 1
    assert!(pruner.should_prune(9, 1, &[(0, 5.0), (1, 5.0)], &history));
    // 1.5 beats the median
    assert!(!pruner.should_prune(9, 1, &[(0, 1.5), (1, 1.5)], &history));
}

#[test]
fn direction_flips_the_comparison() {
    let history = vec![
        trial_with_values(0, &[1.0]),
        trial_with_values(1, &[2.0]),
        trial_with_values(2, &[3.0]),
    ];
    let pruner = MedianPruner::new(Direction::Maximize);

    assert!(pruner.should_prune(9, 0, &[(0, 1.5)], &history));
    assert!(!pruner.should_prune(9, 0, &[(0, 2.5)], &history));
}

#[test]
fn min_trials_gate_holds_off_early_pruning() {
    let history = vec![trial_with_values(0, &[1.0])];
    let pruner = MedianPruner::new(Direction::Minimize).min_trials(3);

    assert!(!pruner.should_prune(9, 0, &[(0, 100.0)], &history));
}

#[test]
fn warmup_steps_disable_pruning() {
    let history = vec![
        trial_with_values(0, &[1.0, 1.0, 1.0]),
        trial_with_values(1, &[1.0, 1.0, 1.0]),
    ];
    let pruner = MedianPruner::new(Direction::Minimize).warmup_steps(2);

    assert!(!pruner.should_prune(9, 1, &[(0, 100.0), (1, 100.0)], &history));
    assert!(pruner.should_prune(9, 2, &[(0, 100.0), (1, 100.0), (2, 100.0)], &history));
}

#[test]
fn pruned_history_is_ignored() {
    let mut weak = trial_with_values(0, &[100.0]);
    weak.state = TrialState::Pruned;
    let history = vec![weak, trial_with_values(1, &[1.0])];
    let pruner = MedianPruner::new(Direction::Minimize);

    // Median over completed trials only is 1.0, so 50.0 gets pruned even
    // though it beats the pruned trial's 100.0.
    assert!(pruner.should_prune(9, 0, &[(0, 50.0)], &history));
}

#[test]
fn missing_step_in_history_is_skipped() {
    let history = vec![trial_with_values(0, &[1.0])];
    let pruner = MedianPruner::new(Direction::Minimize);

    // No history trial reported at step 5
    assert!(!pruner.should_prune(9, 5, &[(5, 100.0)], &history));
}
