use gridtune::parameter::{FloatParam, Parameter};
use gridtune::sampler::RandomSampler;
use gridtune::{Direction, Error, Study, Trial};

#[test]
fn optimize_finds_a_reasonable_minimum() {
    let study = Study::with_sampler(Direction::Minimize, RandomSampler::with_seed(42));
    let x = FloatParam::new(-10.0, 10.0).name("x");

    study
        .optimize(200, |trial: &mut Trial| {
            let v = x.suggest(trial)?;
            Ok::<_, Error>((v - 3.0).powi(2))
        })
        .unwrap();

    assert_eq!(study.n_trials(), 200);
    let best = study.best_trial().unwrap();
    assert!(best.value < 1.0, "best value {} too far from 0", best.value);
    let best_x = best.get(&x).unwrap();
    assert!((best_x - 3.0).abs() < 1.5);
}

#[test]
fn direction_decides_the_winner() {
    let run = |direction| {
        let study = Study::new(direction);
        for value in [1.0, 5.0, 3.0] {
            let trial = study.create_trial();
            study.complete_trial(trial, value);
        }
        study.best_value().unwrap()
    };

    assert!((run(Direction::Minimize) - 1.0).abs() < f64::EPSILON);
    assert!((run(Direction::Maximize) - 5.0).abs() < f64::EPSILON);
}

#[test]
fn best_trial_errors_without_completions() {
    let study = Study::new(Direction::Minimize);
    assert!(matches!(study.best_trial(), Err(Error::NoCompletedTrials)));
}

#[test]
fn failing_objective_surfaces_no_completed_trials() {
    let study = Study::new(Direction::Minimize);
    let err = study
        .optimize(5, |_t: &mut Trial| Err::<f64, _>("backend down"))
        .unwrap_err();
    assert!(matches!(err, Error::NoCompletedTrials));
    assert_eq!(study.n_trials(), 0);
}

#[test]
fn seeded_studies_reproduce() {
    let run = || {
        let study = Study::with_sampler(Direction::Minimize, RandomSampler::with_seed(7));
        let x = FloatParam::new(0.0, 1.0);
        study
            .optimize(20, |trial: &mut Trial| {
                Ok::<_, Error>(x.suggest(trial)?)
            })
            .unwrap();
        study.best_value().unwrap()
    };

    assert!((run() - run()).abs() < f64::EPSILON);
}

#[test]
fn summary_reports_best_parameters() {
    let study = Study::with_sampler(Direction::Maximize, RandomSampler::with_seed(9));
    let lr = FloatParam::new(1e-5, 1e-2).log_scale().name("lr");

    study
        .optimize(10, |trial: &mut Trial| {
            let _ = lr.suggest(trial)?;
            Ok::<_, Error>(1.0)
        })
        .unwrap();

    let summary = study.summary();
    assert!(summary.contains("Maximize"));
    assert!(summary.contains("10 trials"));
    assert!(summary.contains("lr ="));
}
