use gridtune::pruner::NoImprovementPruner;
use gridtune::sampler::RandomSampler;
use gridtune::{Direction, Study, TrialPruned};

/// Run `scores` against a fresh study and return the step at which the
/// trial was pruned, if it was.
fn pruned_at(direction: Direction, pruner: NoImprovementPruner, scores: &[f64]) -> Option<u64> {
    let study = Study::with_sampler_and_pruner(direction, RandomSampler::with_seed(0), pruner);
    let mut trial = study.ask();
    for (step, &score) in scores.iter().enumerate() {
        trial.report(step as u64, score);
        if trial.should_prune() {
            let step = step as u64;
            study.prune_trial(trial);
            return Some(step);
        }
    }
    study.complete_trial(trial, *scores.last().unwrap());
    None
}

#[test]
fn stalled_minimization_is_pruned() {
    let pruner = NoImprovementPruner::new(Direction::Minimize)
        .warmup_steps(0)
        .patience(2)
        .min_improvement(1.0);
    // Improvement of exactly 1.0 at step 1 does not reset the stall.
    let at = pruned_at(Direction::Minimize, pruner, &[10.0, 9.0, 9.0, 9.0, 9.0, 9.0]);
    assert_eq!(at, Some(3));
}

#[test]
fn stalled_maximization_is_pruned() {
    let pruner = NoImprovementPruner::new(Direction::Maximize)
        .warmup_steps(0)
        .patience(1)
        .min_improvement(1.0);
    let at = pruned_at(Direction::Maximize, pruner, &[1.0, 2.0, 3.0, 3.0, 3.0]);
    assert_eq!(at, Some(4));
}

#[test]
fn steady_improvement_is_never_pruned() {
    let pruner = NoImprovementPruner::new(Direction::Maximize)
        .warmup_steps(0)
        .patience(1)
        .min_improvement(1.0);
    let scores: Vec<f64> = (0..20).map(|i| f64::from(i) * 2.0).collect();
    assert_eq!(pruned_at(Direction::Maximize, pruner, &scores), None);
}

#[test]
fn warmup_holds_off_pruning() {
    let pruner = NoImprovementPruner::new(Direction::Minimize)
        .warmup_steps(10)
        .patience(1)
        .min_improvement(1.0);
    // Constant scores the whole way, but only steps 10.. count against
    // patience and the first post-warmup steps measure against the
    // warmup-tracked best at step 0.
    let at = pruned_at(Direction::Minimize, pruner, &[5.0; 13]);
    assert_eq!(at, Some(10));
}

#[test]
fn pruned_trials_are_recorded_with_their_progress() {
    let study = Study::with_sampler_and_pruner(
        Direction::Maximize,
        RandomSampler::with_seed(0),
        NoImprovementPruner::new(Direction::Maximize)
            .warmup_steps(0)
            .patience(1)
            .min_improvement(1.0),
    );

    study
        .optimize(3, |trial: &mut gridtune::Trial| {
            for step in 0..10 {
                trial.report(step, -50.0);
                if trial.should_prune() {
                    return Err(TrialPruned)?;
                }
            }
            Ok::<_, gridtune::Error>(-50.0)
        })
        .unwrap_err();

    assert_eq!(study.n_pruned_trials(), 3);
    for trial in study.trials() {
        assert_eq!(trial.intermediate_values.len(), 3);
    }
}

#[test]
fn concurrent_trials_keep_separate_stall_state() {
    let study = Study::with_sampler_and_pruner(
        Direction::Minimize,
        RandomSampler::with_seed(0),
        NoImprovementPruner::new(Direction::Minimize)
            .warmup_steps(0)
            .patience(2)
            .min_improvement(0.5),
    );

    let mut improving = study.ask();
    let mut stalling = study.ask();

    for step in 0..6 {
        improving.report(step, 100.0 - f64::from(u32::try_from(step).unwrap()) * 10.0);
        assert!(!improving.should_prune());

        stalling.report(step, 100.0);
        if step < 3 {
            assert!(!stalling.should_prune());
        }
    }
    assert!(stalling.should_prune());
}
